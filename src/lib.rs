//! stripjoin reassembles photographs that were sliced into horizontal strips.
//!
//! The crate scores how well two fragments continue each other along a seam
//! ([`compare`]), locates repeated rows at a seam ([`seam`]), composites
//! ordered runs of fragments ([`stitch`]), and walks a sorted fragment list
//! to find and stitch runs ([`sequence`]). Seam scoring can run in parallel
//! via the `rayon` feature; file loading and JPEG output live behind
//! `image-io`.

pub mod color;
pub mod compare;
pub mod image;
pub mod seam;
pub mod sequence;
pub mod stitch;
mod trace;
pub mod util;

pub use color::{ChannelMask, Color, ColorModel, ColorSpace, HslConversion};
pub use compare::{
    block_distance, block_edge_distance, is_within_tolerance, row_distance, RowComparator,
    Tolerance,
};
pub use image::PixelBuffer;
pub use seam::{find_matching_rows, find_optimal_seam, RowPair, SeamMatch, SeamSearch};
pub use sequence::{
    AssemblyReport, Comparison, FragmentSource, MemorySource, ProbeOutcome, ProbeState,
    SequencePlan, Sequencer, SequencerConfig, StitchedRun,
};
#[cfg(feature = "image-io")]
pub use sequence::FileSource;
pub use stitch::{stitch, JoinSpec, Orientation, Overlap};
pub use util::{StripJoinError, StripJoinResult};
