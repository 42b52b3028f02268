//! Mathematical constants

/// ln(2)
pub const LN_2: f64 = std::f64::consts::LN_2;
/// ln(10)
pub const LN_10: f64 = std::f64::consts::LN_10;
/// π²
pub const PI_SQUARED: f64 = 9.869_604_401_089_358;
/// 6 / π², the density of coprime pairs and of square-free integers
pub const SIX_OVER_PI_SQUARED: f64 = 0.607_927_101_854_026_6;
/// 12 ln(2) / π², the leading coefficient of the mean Euclid step count
pub const EUCLID_STEP_COEFF: f64 = 0.842_765_913_799_235_8;
/// 2 − 2 ln(2), the probability that N mod m < m / 2
pub const REMAINDER_BELOW_HALF: f64 = 0.613_705_638_880_109_4;
