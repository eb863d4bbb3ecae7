//! Grouping a sorted fragment list into runs and stitching them.
//!
//! The sequencer compares the tail of the current run with the next
//! fragment, probing the fixed offsets in [`PROBE_OFFSETS`]. A match extends
//! the run; an exhausted probe, an incomparable pair, or an undecodable
//! fragment closes it. Closed runs of two or more fragments are stitched.
//! Every failure stays local to the pair or run it concerns.

mod probe;
mod source;

pub use probe::{ProbeOutcome, ProbeState, PROBE_OFFSETS};
#[cfg(feature = "image-io")]
pub use source::FileSource;
pub use source::{FragmentSource, MemorySource};

use crate::color::ColorModel;
use crate::compare::{block_edge_distance, row_distance, Tolerance};
use crate::image::PixelBuffer;
use crate::stitch::{stitch, JoinSpec};
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{StripJoinError, StripJoinResult};

/// How adjacent fragments are scored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Comparison {
    /// Whole-row distance between the last and first rows.
    Row { model: ColorModel, force: bool },
    /// Block-averaged single-channel distance along the seam.
    Block { block_size: usize, model: ColorModel },
}

impl Comparison {
    /// Scores the seam between `top` and `bottom` at `offset`.
    pub fn score(
        &self,
        top: &PixelBuffer,
        bottom: &PixelBuffer,
        offset: i64,
    ) -> StripJoinResult<f64> {
        match *self {
            Comparison::Row { model, force } => {
                row_distance(top, top.height() - 1, bottom, 0, model, offset, force)
            }
            Comparison::Block { block_size, model } => {
                block_edge_distance(top, bottom, block_size, model, offset)
            }
        }
    }

    /// Tolerance preset matching this comparison's scale.
    pub fn default_tolerance(&self) -> Tolerance {
        match self {
            Comparison::Row { .. } => Tolerance::ROW_RGB,
            Comparison::Block { .. } => Tolerance::BLOCK_LUMINANCE,
        }
    }
}

impl Default for Comparison {
    fn default() -> Self {
        Comparison::Row {
            model: ColorModel::RGB,
            force: false,
        }
    }
}

/// Immutable settings for one sequencing pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequencerConfig {
    pub comparison: Comparison,
    pub tolerance: Tolerance,
    pub join: JoinSpec,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            comparison: Comparison::default(),
            tolerance: Tolerance::ROW_RGB,
            join: JoinSpec::default(),
        }
    }
}

impl SequencerConfig {
    /// Block comparison with the block tolerance preset.
    pub fn block(block_size: usize) -> Self {
        let comparison = Comparison::Block {
            block_size,
            model: ColorModel::HUE,
        };
        Self {
            comparison,
            tolerance: comparison.default_tolerance(),
            join: JoinSpec::default(),
        }
    }

    /// Sets the comparison and resets the tolerance to its preset.
    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self.tolerance = comparison.default_tolerance();
        self
    }

    /// Overrides the tolerance.
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the join geometry used for stitching runs.
    pub fn with_join(mut self, join: JoinSpec) -> Self {
        self.join = join;
        self
    }
}

/// A run of consecutive fragments found by the sequencer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlannedRun {
    /// Fragment indices, in order.
    pub members: Vec<usize>,
    /// Offset at which each member after the first matched its predecessor.
    pub offsets: Vec<i64>,
}

/// All runs of a source, singletons included.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SequencePlan {
    pub runs: Vec<PlannedRun>,
    /// Indices of fragments that failed to decode.
    pub skipped: Vec<usize>,
}

/// A stitched run handed to the caller's sink.
#[derive(Clone, Debug, PartialEq)]
pub struct StitchedRun {
    /// Name of the first member.
    pub first: String,
    /// Name of the last member.
    pub last: String,
    /// Names of all members, in order.
    pub members: Vec<String>,
    pub image: PixelBuffer,
}

impl StitchedRun {
    fn new(members: Vec<String>, image: PixelBuffer) -> Self {
        let first = members.first().cloned().unwrap_or_default();
        let last = members.last().cloned().unwrap_or_default();
        Self {
            first,
            last,
            members,
            image,
        }
    }
}

/// Summary of an assembly pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Number of runs stitched and handed to the sink.
    pub stitched: usize,
    /// Fragments that ended up in no stitched image, in source order.
    pub unjoined: Vec<String>,
    /// Fragments that failed to decode (also listed in `unjoined`).
    pub skipped: Vec<String>,
}

/// Walks a fragment source and assembles runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sequencer {
    config: SequencerConfig,
}

impl Sequencer {
    /// Creates a sequencer with the given settings.
    pub fn new(config: SequencerConfig) -> Self {
        Self { config }
    }

    /// Returns the settings.
    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Probes `top` against `bottom` at each offset in turn.
    pub fn probe(&self, top: &PixelBuffer, bottom: &PixelBuffer) -> StripJoinResult<ProbeOutcome> {
        let mut state = ProbeState::Matching;
        while let Some(offset) = state.offset() {
            match self.config.comparison.score(top, bottom, offset) {
                Ok(score) if self.config.tolerance.accepts(score) => {
                    return Ok(ProbeOutcome::Matched { offset, score });
                }
                Ok(_) | Err(StripJoinError::EmptyComparison) => {}
                Err(err) if err.is_incomparable() => return Ok(ProbeOutcome::Incomparable),
                Err(err) => return Err(err),
            }
            state = state.next();
        }
        Ok(ProbeOutcome::Exhausted)
    }

    /// Finds the runs of `source` without keeping any pixels around.
    pub fn plan<S>(&self, source: &S) -> StripJoinResult<SequencePlan>
    where
        S: FragmentSource + ?Sized,
    {
        let _span = trace_span!("sequence_plan", fragments = source.len()).entered();
        let mut runs = Vec::new();
        let skipped = self.walk(source, false, |run, _| {
            runs.push(run);
            Ok(())
        })?;
        Ok(SequencePlan { runs, skipped })
    }

    /// Stitches every run of two or more fragments and passes it to `sink`.
    ///
    /// A run that fails to stitch is logged and its members are reported as
    /// unjoined. Errors returned by `sink` abort the pass.
    pub fn assemble<S, F>(&self, source: &S, mut sink: F) -> StripJoinResult<AssemblyReport>
    where
        S: FragmentSource + ?Sized,
        F: FnMut(StitchedRun) -> StripJoinResult<()>,
    {
        let _span = trace_span!("assemble", fragments = source.len()).entered();
        let mut stitched = 0usize;
        let mut unjoined = Vec::new();
        let skipped = self.walk(source, true, |run, pieces| {
            if run.members.len() < 2 {
                unjoined.extend(run.members);
                return Ok(());
            }
            match stitch(&pieces, &self.config.join) {
                Ok(image) => {
                    drop(pieces);
                    sink(StitchedRun::new(names(source, &run.members), image))?;
                    stitched += 1;
                }
                Err(err) => {
                    trace_warn!(
                        "stitch_failed",
                        first = run.members[0],
                        reason = err.to_string().as_str()
                    );
                    unjoined.extend(run.members);
                }
            }
            Ok(())
        })?;

        Ok(finish_report(source, stitched, unjoined, skipped))
    }

    /// Stitches consecutive groups of `pieces_per_image` fragments without
    /// comparing them, centering fragments of different widths.
    pub fn assemble_fixed<S, F>(
        &self,
        source: &S,
        pieces_per_image: usize,
        mut sink: F,
    ) -> StripJoinResult<AssemblyReport>
    where
        S: FragmentSource + ?Sized,
        F: FnMut(StitchedRun) -> StripJoinResult<()>,
    {
        if pieces_per_image == 0 {
            return Err(StripJoinError::InvalidInput(
                "pieces per image must be positive",
            ));
        }
        let _span = trace_span!("assemble_fixed", fragments = source.len()).entered();
        let join = self.config.join.with_force(true);
        let indices: Vec<usize> = (0..source.len()).collect();

        let mut stitched = 0usize;
        let mut unjoined = Vec::new();
        let mut skipped = Vec::new();
        for group in indices.chunks(pieces_per_image) {
            let mut members = Vec::with_capacity(group.len());
            let mut pieces = Vec::with_capacity(group.len());
            for &idx in group {
                match self.load(source, idx) {
                    Some(buf) => {
                        members.push(idx);
                        pieces.push(buf);
                    }
                    None => skipped.push(idx),
                }
            }
            if pieces.len() < 2 {
                unjoined.extend(members);
                continue;
            }
            match stitch(&pieces, &join) {
                Ok(image) => {
                    drop(pieces);
                    sink(StitchedRun::new(names(source, &members), image))?;
                    stitched += 1;
                }
                Err(err) => {
                    trace_warn!(
                        "stitch_failed",
                        first = members[0],
                        reason = err.to_string().as_str()
                    );
                    unjoined.extend(members);
                }
            }
        }

        Ok(finish_report(source, stitched, unjoined, skipped))
    }

    /// Core walk shared by [`plan`](Self::plan) and
    /// [`assemble`](Self::assemble). Calls `on_run` for every closed run,
    /// with the decoded members when `keep_pieces` is set. Returns the
    /// indices of undecodable fragments.
    fn walk<S, F>(
        &self,
        source: &S,
        keep_pieces: bool,
        mut on_run: F,
    ) -> StripJoinResult<Vec<usize>>
    where
        S: FragmentSource + ?Sized,
        F: FnMut(PlannedRun, Vec<PixelBuffer>) -> StripJoinResult<()>,
    {
        let len = source.len();
        let mut skipped = Vec::new();
        let mut next = 0usize;
        let mut carried: Option<(usize, PixelBuffer)> = None;

        loop {
            let (start, first) = match carried.take() {
                Some(entry) => entry,
                None => {
                    if next >= len {
                        break;
                    }
                    let idx = next;
                    next += 1;
                    match self.load(source, idx) {
                        Some(buf) => (idx, buf),
                        None => {
                            skipped.push(idx);
                            continue;
                        }
                    }
                }
            };

            let mut run = PlannedRun {
                members: vec![start],
                offsets: Vec::new(),
            };
            let mut pieces = Vec::new();
            let mut tail = first;
            while next < len {
                let idx = next;
                next += 1;
                let Some(candidate) = self.load(source, idx) else {
                    skipped.push(idx);
                    break;
                };
                match self.probe(&tail, &candidate)? {
                    ProbeOutcome::Matched { offset, .. } => {
                        run.members.push(idx);
                        run.offsets.push(offset);
                        let previous = std::mem::replace(&mut tail, candidate);
                        if keep_pieces {
                            pieces.push(previous);
                        }
                    }
                    outcome => {
                        trace_event!(
                            "run_closed",
                            start = start,
                            len = run.members.len(),
                            exhausted = outcome == ProbeOutcome::Exhausted
                        );
                        carried = Some((idx, candidate));
                        break;
                    }
                }
            }

            if keep_pieces {
                pieces.push(tail);
            }
            on_run(run, pieces)?;
        }

        Ok(skipped)
    }

    fn load<S>(&self, source: &S, idx: usize) -> Option<PixelBuffer>
    where
        S: FragmentSource + ?Sized,
    {
        match source.load(idx) {
            Ok(buf) => Some(buf),
            Err(err) => {
                trace_warn!(
                    "fragment_skipped",
                    index = idx,
                    reason = err.to_string().as_str()
                );
                None
            }
        }
    }
}

fn names<S>(source: &S, indices: &[usize]) -> Vec<String>
where
    S: FragmentSource + ?Sized,
{
    indices.iter().map(|&idx| source.name(idx)).collect()
}

fn finish_report<S>(
    source: &S,
    stitched: usize,
    mut unjoined: Vec<usize>,
    mut skipped: Vec<usize>,
) -> AssemblyReport
where
    S: FragmentSource + ?Sized,
{
    skipped.sort_unstable();
    unjoined.extend_from_slice(&skipped);
    unjoined.sort_unstable();
    AssemblyReport {
        stitched,
        unjoined: names(source, &unjoined),
        skipped: names(source, &skipped),
    }
}
