//! Speed unit conversion.  Physics runs in metres and seconds; operators
//! think in km/h.

const KMH_PER_MPS: f64 = 3.6;

#[inline]
pub fn kmh_to_mps(kmh: f64) -> f64 {
    kmh / KMH_PER_MPS
}

#[inline]
pub fn mps_to_kmh(mps: f64) -> f64 {
    mps * KMH_PER_MPS
}
