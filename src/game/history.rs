//! The played line of a game.
//!
//! History keeps the sequence of positions from the start of the game, each
//! tagged with the move that reached it, and notifies registered observers
//! whenever a move is added or taken back.

use std::fmt;

use crate::board::Move;

use super::state::{MoveOutcome, State};
use super::GameError;

/// One entry of the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryNode {
    mv: Option<Move>,
    takata: bool,
    state: State,
}

impl HistoryNode {
    /// The move that led here; `None` for the root.
    pub fn mv(&self) -> Option<Move> {
        self.mv
    }

    /// Whether the move was played on a takata turn.
    pub fn takata(&self) -> bool {
        self.takata
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// The move as written in a game record: takata moves carry a `*`.
    pub fn label(&self) -> Option<String> {
        self.mv
            .map(|mv| if self.takata { format!("{mv}*") } else { mv.to_string() })
    }
}

/// What happened to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOp {
    Branch,
    Pop,
}

/// Handle returned by `subscribe`.
pub type ObserverId = usize;

type Observer = Box<dyn FnMut(&HistoryNode, HistoryOp)>;

/// A linear game history rooted at the starting position.
pub struct History {
    nodes: Vec<HistoryNode>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: ObserverId,
}

impl History {
    pub fn new(root: State) -> Self {
        History {
            nodes: vec![HistoryNode { mv: None, takata: false, state: root }],
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    /// The latest position.
    pub fn current(&self) -> &State {
        &self.top().state
    }

    pub fn top(&self) -> &HistoryNode {
        // The root is never removed.
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn root(&self) -> &HistoryNode {
        &self.nodes[0]
    }

    /// Number of positions, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// The root is never popped, so this is `false`; `ply() == 0` tells
    /// whether any move has been played.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of moves played.
    pub fn ply(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&HistoryNode> {
        self.nodes.get(index)
    }

    /// Nodes from the root to the latest position.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryNode> {
        self.nodes.iter()
    }

    /// Labels of every move played, oldest first.
    pub fn labels(&self) -> Vec<String> {
        self.nodes.iter().filter_map(HistoryNode::label).collect()
    }

    /// Plays `mv` from the latest position.
    ///
    /// With `execute` the move is played afresh; otherwise the cached child
    /// from move generation is reused. Either way the result is the same.
    pub fn branch(&mut self, mv: Move, execute: bool) -> Result<&HistoryNode, GameError> {
        let parent = self.current();
        let takata = parent.is_forced_turn()?;
        let state = match parent.outcome(&mv)? {
            MoveOutcome::NotApplicable => return Err(GameError::IllegalMove(mv)),
            MoveOutcome::TooLong => return Err(GameError::LongMove(mv)),
            MoveOutcome::Overrun { steps } => return Err(GameError::ExecutionOverrun { steps }),
            MoveOutcome::Legal(child) if !execute => child.clone(),
            MoveOutcome::Legal(_) => parent.execute(mv, |_, _| {})?,
        };
        self.push(HistoryNode { mv: Some(mv), takata, state });
        Ok(self.top())
    }

    /// Plays a move written as in a game record. A trailing `*` asserts the
    /// turn is takata and is rejected on mtaji turns.
    pub fn branch_label(&mut self, label: &str, execute: bool) -> Result<&HistoryNode, GameError> {
        let (token, marked) = match label.strip_suffix('*') {
            Some(token) => (token, true),
            None => (label, false),
        };
        let mv: Move = token.parse()?;
        if marked && !self.current().is_forced_turn()? {
            return Err(GameError::TakataMarker(mv));
        }
        self.branch(mv, execute)
    }

    /// Takes back the latest move and returns its node. At the root nothing
    /// is removed and the root is returned.
    pub fn pop(&mut self) -> HistoryNode {
        if self.nodes.len() > 1 {
            if let Some(node) = self.nodes.pop() {
                for (_, observer) in self.observers.iter_mut() {
                    observer(&node, HistoryOp::Pop);
                }
                return node;
            }
        }
        self.root().clone()
    }

    /// Registers an observer called after every branch and pop.
    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&HistoryNode, HistoryOp) + 'static,
    {
        let id = self.next_observer;
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    fn push(&mut self, node: HistoryNode) {
        self.nodes.push(node);
        let node = &self.nodes[self.nodes.len() - 1];
        for (_, observer) in self.observers.iter_mut() {
            observer(node, HistoryOp::Branch);
        }
    }
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("nodes", &self.nodes)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::game::new_game;
    use crate::rules::Variant;

    fn mv(s: &str) -> Move {
        s.parse().unwrap()
    }

    #[test]
    fn branch_and_pop() {
        let mut history = new_game(Variant::Ntchuwa.rules());
        let root = history.current().clone();
        let node = history.branch(mv("A1L"), false).unwrap();
        assert_eq!(node.label().as_deref(), Some("A1L"));
        assert!(!node.takata());
        assert_eq!(history.len(), 2);

        let popped = history.pop();
        assert_eq!(popped.mv(), Some(mv("A1L")));
        assert_eq!(history.current(), &root);
        assert_eq!(history.pop().mv(), None);
        assert_eq!(history.len(), 1);
        assert_eq!(history.ply(), 0);
        assert!(!history.is_empty());
    }

    #[test]
    fn executed_and_cached_branches_agree() {
        let mut cached = new_game(Variant::Yawana.rules());
        let mut executed = new_game(Variant::Yawana.rules());
        let first = *cached.current().playable_moves().unwrap().first().unwrap();
        let a = cached.branch(first, false).unwrap().state().clone();
        let b = executed.branch(first, true).unwrap().state().clone();
        assert_eq!(a, b);
    }

    #[test]
    fn takata_moves_are_labelled() {
        let mut history = new_game(Variant::Yabambo.rules());
        history.branch_label("A5L*", true).unwrap();
        assert_eq!(history.labels(), ["A5L*"]);

        let mut history = new_game(Variant::Ntchuwa.rules());
        let err = history.branch_label("A1L*", true).unwrap_err();
        assert_eq!(err, GameError::TakataMarker(mv("A1L")));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn illegal_moves_leave_history_unchanged() {
        let mut history = new_game(Variant::Ntchuwa.rules());
        assert_eq!(history.branch(mv("B1L"), true).unwrap_err(), GameError::IllegalMove(mv("B1L")));
        assert!(matches!(history.branch_label("Z1L", true), Err(GameError::Parse(_))));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn observers_see_branches_and_pops() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut history = new_game(Variant::Ntchuwa.rules());
        let sink = Rc::clone(&log);
        let id = history.subscribe(move |node, op| {
            sink.borrow_mut().push((node.label(), op));
        });

        history.branch(mv("A1L"), false).unwrap();
        history.pop();
        history.pop();
        assert_eq!(
            *log.borrow(),
            vec![
                (Some("A1L".to_string()), HistoryOp::Branch),
                (Some("A1L".to_string()), HistoryOp::Pop),
            ]
        );

        assert!(history.unsubscribe(id));
        assert!(!history.unsubscribe(id));
        history.branch(mv("A1L"), false).unwrap();
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn iteration_runs_root_first() {
        let mut history = new_game(Variant::Ntchuwa.rules());
        history.branch(mv("A1L"), false).unwrap();
        let moves: Vec<Option<Move>> = history.iter().map(HistoryNode::mv).collect();
        assert_eq!(moves, [None, Some(mv("A1L"))]);
        assert_eq!(history.get(1).and_then(HistoryNode::mv), Some(mv("A1L")));
        assert_eq!(history.ply(), 1);
    }
}
