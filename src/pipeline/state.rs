//! Per-request pipeline stage machine.
//!
//! ```text
//! Start ──load──▶ Loaded ──extract──▶ FeaturesExtracted ──predict──▶ Predicted ──▶ Done
//!   │               │                      │                            │
//!   └───────────────┴──────── any error ───┴────────────────────────────┴──▶ Failed
//! ```
//!
//! `Done` and `Failed` are terminal.  Stages are never skipped.

/// Where a single inference request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineStage {
    #[default]
    Start,
    /// Waveform decoded, trimmed and fitted.
    Loaded,
    /// Feature matrix computed.
    FeaturesExtracted,
    /// Scores produced by the classifier.
    Predicted,
    Done,
    Failed,
}

impl PipelineStage {
    /// The stage reached by completing the current one, or `None` when
    /// terminal.
    ///
    /// ```
    /// use speech_emotion::pipeline::PipelineStage;
    ///
    /// assert_eq!(PipelineStage::Start.next(), Some(PipelineStage::Loaded));
    /// assert_eq!(PipelineStage::Predicted.next(), Some(PipelineStage::Done));
    /// assert_eq!(PipelineStage::Done.next(), None);
    /// assert_eq!(PipelineStage::Failed.next(), None);
    /// ```
    pub fn next(self) -> Option<Self> {
        match self {
            PipelineStage::Start => Some(PipelineStage::Loaded),
            PipelineStage::Loaded => Some(PipelineStage::FeaturesExtracted),
            PipelineStage::FeaturesExtracted => Some(PipelineStage::Predicted),
            PipelineStage::Predicted => Some(PipelineStage::Done),
            PipelineStage::Done | PipelineStage::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }

    /// The work performed while leaving this stage, for log messages.
    pub fn label(self) -> &'static str {
        match self {
            PipelineStage::Start => "audio loading",
            PipelineStage::Loaded => "feature extraction",
            PipelineStage::FeaturesExtracted => "prediction",
            PipelineStage::Predicted => "result assembly",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }
}

/// Tracks one request through the stages, refusing illegal jumps.
#[derive(Debug, Default)]
pub struct StageTracker {
    current: PipelineStage,
    failed_at: Option<PipelineStage>,
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> PipelineStage {
        self.current
    }

    /// The stage that was active when the request failed.
    pub fn failed_at(&self) -> Option<PipelineStage> {
        self.failed_at
    }

    /// Move to the next stage.  A terminal tracker stays where it is.
    pub fn advance(&mut self) -> PipelineStage {
        if let Some(next) = self.current.next() {
            log::debug!("pipeline: {} complete", self.current.label());
            self.current = next;
        }
        self.current
    }

    /// Enter `Failed`, remembering where.  Already-terminal trackers are
    /// left untouched.
    pub fn fail(&mut self) {
        if !self.current.is_terminal() {
            self.failed_at = Some(self.current);
            self.current = PipelineStage::Failed;
        }
    }
}
