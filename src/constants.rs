pub const G: f64 = 6.67430e-11; // Gravitational constant (length³/mass/time²)

// Propagation
pub const SOFTENING_DEFAULT: f64 = 1e-3; // Gravitational softening length
pub const SUBSTEP_DEFAULT: f64 = 1.0 / 16.0; // Fixed internal integration sub-step (time units)

// Planner tolerances
pub const ECC_CIRCULAR_TOL: f64 = 1e-6; // Eccentricity below this counts as circular
pub const RADIUS_MATCH_TOL: f64 = 1e-6; // Relative radius difference treated as equal
pub const BIELLIPTIC_RATIO: f64 = 11.94; // Radius ratio above which bi-elliptic beats Hohmann
pub const PHASING_MAX_TRIES: usize = 32; // Retry budget for the phasing-orbit search
pub const RENDEZVOUS_MAX_REVS: usize = 1000; // Revolution budget for the wait-time search

// Recording
pub const SAMPLE_SPACING_DEFAULT: f64 = 1e-2; // Minimum distance between trajectory samples

// Math
pub const PI: f64 = std::f64::consts::PI;
pub const TAU: f64 = 2.0 * PI;
