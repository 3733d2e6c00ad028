//! tramos: reduce GPX tracks into trip-planning segments.
//!
//! A track's points become raw micro-segments, which are merged by direction
//! and by several threshold passes until only meaningful climbs, descents and
//! flats remain. The result is written as a planning sheet.

pub mod batch_processor;
pub mod direction_grouper;
pub mod error;
pub mod output_target;
pub mod plan_writer;
pub mod segment;
pub mod segment_deriver;
pub mod segment_pipeline;
pub mod threshold_reducer;
pub mod track_reader;

pub use error::{Result, TramosError};
pub use plan_writer::{PlanSettings, PlanSheet, Preparation, Section};
pub use segment::{Direction, FinalSegment, Segment, TrackPoint};
pub use segment_pipeline::{compute_segments, compute_segments_traced, PipelineTrace, Thresholds};
