mod canonicalize;
mod chunker;
mod resample;

pub use canonicalize::WavCanonicalizer;
pub use chunker::WavChunker;
pub use resample::resample_linear;
