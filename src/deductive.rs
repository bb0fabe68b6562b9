mod limits;
pub use limits::{Budget, Config, ResourceLimits};

mod top_down_vsa;
pub use top_down_vsa::{synthesize, version_space, Synthesizer};
