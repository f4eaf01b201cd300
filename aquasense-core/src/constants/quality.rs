//! Fuzzy Water-Quality Breakpoints
//!
//! Trapezoid breakpoints `[a, b, c, d]` for each linguistic term and the
//! score thresholds that map a defuzzified score to a category. Tuned for
//! freshwater aquaculture ponds.

// ===== pH TERMS =====

/// Acidic water. Left shoulder.
pub const PH_LOW: [f32; 4] = [0.0, 0.0, 6.5, 7.2];

/// Target band for most freshwater stock.
pub const PH_NORMAL: [f32; 4] = [7.0, 7.5, 8.0, 8.5];

/// Alkaline water. Right shoulder.
pub const PH_HIGH: [f32; 4] = [8.2, 9.0, 14.0, 14.0];

// ===== TDS TERMS (ppm) =====

/// Mineral-poor water. Left shoulder.
pub const TDS_LOW: [f32; 4] = [0.0, 0.0, 200.0, 350.0];

/// Target mineral content.
pub const TDS_MEDIUM: [f32; 4] = [300.0, 400.0, 600.0, 800.0];

/// Mineral-heavy water. Right shoulder.
pub const TDS_HIGH: [f32; 4] = [700.0, 1000.0, 3000.0, 3000.0];

// ===== TURBIDITY TERMS (NTU) =====

/// Very clear water, low plankton. Left shoulder.
pub const TURBIDITY_CLEAR: [f32; 4] = [0.0, 0.0, 15.0, 25.0];

/// Healthy plankton density.
pub const TURBIDITY_OPTIMAL: [f32; 4] = [20.0, 25.0, 35.0, 45.0];

/// Murky water. Right shoulder.
pub const TURBIDITY_TURBID: [f32; 4] = [40.0, 60.0, 150.0, 150.0];

/// Floor for a shoulder's sloped width, avoids dividing by zero.
pub const MIN_SLOPE_WIDTH: f32 = 1e-4;

// ===== CATEGORY THRESHOLDS (score 0-100) =====

/// Lowest score rated excellent.
pub const SCORE_EXCELLENT: f32 = 85.0;

/// Lowest score rated good.
pub const SCORE_GOOD: f32 = 70.0;

/// Lowest score rated fair.
pub const SCORE_FAIR: f32 = 50.0;

/// Lowest score rated poor. Anything below is critical.
pub const SCORE_POOR: f32 = 30.0;
