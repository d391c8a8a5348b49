//! Core estimation algorithms

pub mod geodesic;
pub mod path_loss;
pub mod single_anchor;
pub mod two_anchor;
pub mod trilateration;
pub mod spoofing;

pub use path_loss::DistanceModel;
pub use spoofing::SpoofingScorer;
pub use trilateration::MultiAnchorTrilaterator;
