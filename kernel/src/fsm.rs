//! Interaction state machine.
//!
//! Gestures are modelled as a stack of [`ModeState`]s. The top frame receives
//! events and answers with a [`Transition`]; the machine applies it, running
//! `on_end` / `on_start` hooks in order. A transition returned from `on_start`
//! is applied immediately, so a state can forward to another one before the
//! next event arrives. The chain is capped at [`MAX_TRANSITION_CHAIN`].
//!
//! States are generic over the context `C` they mutate, which keeps the
//! machine testable with a plain recording context.

#[cfg(test)]
#[path = "fsm_test.rs"]
mod fsm_test;

use std::fmt;

use tracing::{debug, warn};

use crate::consts::MAX_TRANSITION_CHAIN;
use crate::input::ModeStateEvent;
use crate::render::RenderOverlay;

/// How a stacked state treats the state beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    /// The state below is ended now and started again when the stacked state breaks.
    Restart,
    /// The state below is paused untouched and continues as-is afterwards.
    Resume,
}

/// What the current state asks the machine to do next.
pub enum Transition<C> {
    None,
    /// Swap the top state. The frame keeps its stack kind.
    Replace(Box<dyn ModeState<C>>),
    /// Push a state on top of the current one.
    Stack { state: Box<dyn ModeState<C>>, kind: StackKind },
    /// Pop the top state.
    Break,
}

impl<C> Transition<C> {
    #[must_use]
    pub fn replace(state: impl ModeState<C> + 'static) -> Self {
        Self::Replace(Box::new(state))
    }

    #[must_use]
    pub fn stack(state: impl ModeState<C> + 'static, kind: StackKind) -> Self {
        Self::Stack { state: Box::new(state), kind }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl<C> fmt::Debug for Transition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Replace(state) => f.debug_tuple("Replace").field(&state.label()).finish(),
            Self::Stack { state, kind } => f
                .debug_struct("Stack")
                .field("state", &state.label())
                .field("kind", kind)
                .finish(),
            Self::Break => f.write_str("Break"),
        }
    }
}

/// One interaction mode.
pub trait ModeState<C> {
    fn label(&self) -> String;

    fn on_start(&mut self, _ctx: &mut C) -> Transition<C> {
        Transition::None
    }

    fn on_end(&mut self, _ctx: &mut C) {}

    fn handle_event(&mut self, ctx: &mut C, event: &ModeStateEvent) -> Transition<C>;

    /// Describe this state's overlay. Called bottom to top over the stack.
    fn render(&self, _ctx: &C, _overlay: &mut RenderOverlay) {}
}

struct Frame<C> {
    state: Box<dyn ModeState<C>>,
    /// How this frame was pushed; `None` for the base frame.
    kind: Option<StackKind>,
    /// `on_end` already ran (a restart-stack put it to sleep).
    ended: bool,
}

impl<C> Frame<C> {
    fn new(state: Box<dyn ModeState<C>>, kind: Option<StackKind>) -> Self {
        Self { state, kind, ended: false }
    }

    fn end(&mut self, ctx: &mut C) {
        if !self.ended {
            self.state.on_end(ctx);
            self.ended = true;
        }
    }
}

type StateFactory<C> = Box<dyn Fn() -> Box<dyn ModeState<C>>>;

/// Stack of mode states with a factory for the base state.
pub struct StateMachine<C> {
    stack: Vec<Frame<C>>,
    initial: StateFactory<C>,
}

impl<C> StateMachine<C> {
    pub fn new(initial: impl Fn() -> Box<dyn ModeState<C>> + 'static) -> Self {
        Self { stack: Vec::new(), initial: Box::new(initial) }
    }

    /// Seed the base state if the stack is empty and run its `on_start`.
    pub fn start(&mut self, ctx: &mut C) {
        if self.stack.is_empty() {
            self.seed(ctx);
        }
    }

    pub fn handle_event(&mut self, ctx: &mut C, event: &ModeStateEvent) {
        self.start(ctx);
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        let transition = top.state.handle_event(ctx, event);
        if !transition.is_none() {
            debug!(event = event.kind(), modifiers = ?event.modifiers(), from = %self.label(), ?transition, "mode transition");
        }
        self.apply(ctx, transition);
    }

    /// Frame labels joined bottom to top with `:`.
    #[must_use]
    pub fn label(&self) -> String {
        self.stack.iter().map(|f| f.state.label()).collect::<Vec<_>>().join(":")
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn render(&self, ctx: &C, overlay: &mut RenderOverlay) {
        for frame in &self.stack {
            frame.state.render(ctx, overlay);
        }
    }

    /// End every live frame, top first, and empty the stack.
    pub fn dispose(&mut self, ctx: &mut C) {
        while let Some(mut frame) = self.stack.pop() {
            frame.end(ctx);
        }
    }

    fn seed(&mut self, ctx: &mut C) {
        self.stack.push(Frame::new((self.initial)(), None));
        let transition = self.top_on_start(ctx);
        self.apply(ctx, transition);
    }

    fn top_on_start(&mut self, ctx: &mut C) -> Transition<C> {
        match self.stack.last_mut() {
            Some(top) => {
                top.ended = false;
                top.state.on_start(ctx)
            }
            None => Transition::None,
        }
    }

    fn apply(&mut self, ctx: &mut C, transition: Transition<C>) {
        let mut next = transition;
        let mut steps = 0;
        loop {
            if next.is_none() {
                return;
            }
            if steps >= MAX_TRANSITION_CHAIN {
                warn!(label = %self.label(), limit = MAX_TRANSITION_CHAIN, "transition chain limit reached");
                return;
            }
            steps += 1;
            next = match next {
                Transition::None => Transition::None,
                Transition::Replace(state) => {
                    let kind = match self.stack.pop() {
                        Some(mut top) => {
                            top.end(ctx);
                            top.kind
                        }
                        None => None,
                    };
                    self.stack.push(Frame::new(state, kind));
                    self.top_on_start(ctx)
                }
                Transition::Stack { state, kind } => {
                    if kind == StackKind::Restart {
                        if let Some(top) = self.stack.last_mut() {
                            top.end(ctx);
                        }
                    }
                    self.stack.push(Frame::new(state, Some(kind)));
                    self.top_on_start(ctx)
                }
                Transition::Break => match self.stack.pop() {
                    Some(mut top) => {
                        top.end(ctx);
                        if self.stack.is_empty() {
                            self.stack.push(Frame::new((self.initial)(), None));
                            self.top_on_start(ctx)
                        } else if top.kind == Some(StackKind::Restart) {
                            self.top_on_start(ctx)
                        } else {
                            Transition::None
                        }
                    }
                    None => Transition::None,
                },
            };
            debug!(label = %self.label(), "mode stack");
        }
    }
}

/// A state that owns a nested machine.
///
/// Events reach the inner machine first and then the outer state; only the
/// outer state's transitions leave the group.
pub struct GroupState<C> {
    outer: Box<dyn ModeState<C>>,
    inner: StateMachine<C>,
}

impl<C> GroupState<C> {
    pub fn new(outer: impl ModeState<C> + 'static, inner: impl Fn() -> Box<dyn ModeState<C>> + 'static) -> Self {
        Self { outer: Box::new(outer), inner: StateMachine::new(inner) }
    }
}

impl<C> ModeState<C> for GroupState<C> {
    fn label(&self) -> String {
        format!("{}:{}", self.outer.label(), self.inner.label())
    }

    fn on_start(&mut self, ctx: &mut C) -> Transition<C> {
        let transition = self.outer.on_start(ctx);
        if transition.is_none() {
            self.inner.start(ctx);
        }
        transition
    }

    fn on_end(&mut self, ctx: &mut C) {
        self.inner.dispose(ctx);
        self.outer.on_end(ctx);
    }

    fn handle_event(&mut self, ctx: &mut C, event: &ModeStateEvent) -> Transition<C> {
        self.inner.handle_event(ctx, event);
        self.outer.handle_event(ctx, event)
    }

    fn render(&self, ctx: &C, overlay: &mut RenderOverlay) {
        self.outer.render(ctx, overlay);
        self.inner.render(ctx, overlay);
    }
}
