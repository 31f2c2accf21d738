//! Diagnostic events and sinks for observing layout generation and placement.
//!
//! Generators and the placement engine never fail on expected edge cases. They
//! degrade (childless nodes, skipped rules, best-effort positions) and report
//! each degradation as a [`LayoutEvent`] sent to the caller's [`EventSink`].
//! Tests and collaborators can then assert on degradation paths directly.
use crate::layout::config::SubplotRuleType;
use crate::placement::PlacedObservation;

/// Describes events emitted while generating layouts or placing observations.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum LayoutEvent {
    /// Emitted when a generator starts resolving a layout.
    GenerationStarted {
        /// Blueprint id, or `"configuration"` for parametric layouts.
        source: String,
        /// Plot the layout is generated for, if any.
        plot_id: Option<String>,
    },

    /// Emitted when a generator finished resolving a layout.
    GenerationFinished {
        /// Total number of nodes in the produced tree.
        node_count: usize,
        /// Number of sampling units in the produced tree.
        sampling_unit_count: usize,
    },

    /// A children generator cannot run on its parent's shape; the node stays childless.
    GeneratorShapeMismatch {
        /// Structural path of the parent.
        path: String,
        /// Generator kind, e.g. `GRID`.
        generator: &'static str,
        /// Parent shape kind.
        shape: &'static str,
    },

    /// A child was placed (partly) outside its parent's bounds.
    ChildOutOfBounds {
        /// Structural path of the child.
        path: String,
        /// Resolved label of the child.
        label: String,
    },

    /// A subplot rule was accepted but its placement mode is not implemented.
    SubplotNotImplemented {
        /// Index of the rule in the configuration.
        rule_index: usize,
        /// The rule's type.
        rule_type: SubplotRuleType,
    },

    /// An observation references a unit that is not a sampling unit of the layout.
    UnknownUnit {
        observation_id: String,
        unit_id: String,
    },

    /// Rejection sampling ran out of attempts; the last candidate was used.
    PlacementExhausted {
        observation_id: String,
        unit_id: String,
        attempts: u32,
    },

    /// Emitted for each placed observation.
    ObservationPlaced { placement: PlacedObservation },

    /// Non-fatal warning that fits no other variant.
    Warning {
        /// Context string (e.g. structural path, unit id).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Fieldless discriminant of [`LayoutEvent`], used for sink filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutEventKind {
    GenerationStarted,
    GenerationFinished,
    GeneratorShapeMismatch,
    ChildOutOfBounds,
    SubplotNotImplemented,
    UnknownUnit,
    PlacementExhausted,
    ObservationPlaced,
    Warning,
}

impl LayoutEvent {
    pub fn kind(&self) -> LayoutEventKind {
        match self {
            LayoutEvent::GenerationStarted { .. } => LayoutEventKind::GenerationStarted,
            LayoutEvent::GenerationFinished { .. } => LayoutEventKind::GenerationFinished,
            LayoutEvent::GeneratorShapeMismatch { .. } => LayoutEventKind::GeneratorShapeMismatch,
            LayoutEvent::ChildOutOfBounds { .. } => LayoutEventKind::ChildOutOfBounds,
            LayoutEvent::SubplotNotImplemented { .. } => LayoutEventKind::SubplotNotImplemented,
            LayoutEvent::UnknownUnit { .. } => LayoutEventKind::UnknownUnit,
            LayoutEvent::PlacementExhausted { .. } => LayoutEventKind::PlacementExhausted,
            LayoutEvent::ObservationPlaced { .. } => LayoutEventKind::ObservationPlaced,
            LayoutEvent::Warning { .. } => LayoutEventKind::Warning,
        }
    }

    /// Whether the event reports a degraded result rather than progress.
    pub fn is_diagnostic(&self) -> bool {
        !matches!(
            self.kind(),
            LayoutEventKind::GenerationStarted
                | LayoutEventKind::GenerationFinished
                | LayoutEventKind::ObservationPlaced
        )
    }
}

/// A generic event sink that accepts [`LayoutEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: LayoutEvent);

    /// Whether the sink is interested in events of `kind`. Producers skip
    /// building events nobody wants.
    fn wants(&self, _kind: LayoutEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = LayoutEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: LayoutEvent) {}

    #[inline]
    fn wants(&self, _kind: LayoutEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(LayoutEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(LayoutEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(LayoutEvent),
{
    #[inline]
    fn send(&mut self, event: LayoutEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Default)]
pub struct VecSink {
    events: Vec<LayoutEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
        }
    }

    pub fn into_inner(self) -> Vec<LayoutEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[LayoutEvent] {
        &self.events
    }

    /// Number of collected events of `kind`.
    pub fn count(&self, kind: LayoutEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    /// Collected events that report degraded results.
    pub fn diagnostics(&self) -> impl Iterator<Item = &LayoutEvent> {
        self.events.iter().filter(|e| e.is_diagnostic())
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: LayoutEvent) {
        self.events.push(event);
    }
}

/// Sink that only keeps events of the listed kinds.
pub struct FilterSink<S: EventSink> {
    inner: S,
    kinds: Vec<LayoutEventKind>,
}

impl<S: EventSink> FilterSink<S> {
    pub fn new(inner: S, kinds: impl IntoIterator<Item = LayoutEventKind>) -> Self {
        Self {
            inner,
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: EventSink> EventSink for FilterSink<S> {
    fn send(&mut self, event: LayoutEvent) {
        if self.wants(event.kind()) {
            self.inner.send(event);
        }
    }

    fn wants(&self, kind: LayoutEventKind) -> bool {
        self.kinds.contains(&kind) && self.inner.wants(kind)
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn into_inner(self) -> Vec<S> {
        self.sinks
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: LayoutEvent) {
        if self.sinks.is_empty() {
            return;
        }
        let last_idx = self.sinks.len() - 1;
        for i in 0..last_idx {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last_idx].send(event);
    }

    fn wants(&self, kind: LayoutEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}
