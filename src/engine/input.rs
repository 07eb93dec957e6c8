use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

/// Input sources a scene can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Primary pointer press.
    PointerDown,
    Key(char),
}

pub const SPACE: Trigger = Trigger::Key(' ');

impl Trigger {
    pub fn from_event(event: &Event) -> Option<Trigger> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(Trigger::Key(c))
                }
                _ => None,
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => Some(Trigger::PointerDown),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Keys that close the terminal front end, checked before scene bindings.
pub fn is_quit(event: &Event) -> bool {
    match event {
        Event::Key(KeyEvent {
            code, modifiers, ..
        }) => match code {
            KeyCode::Char('q') | KeyCode::Esc => true,
            KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
            _ => false,
        },
        _ => false,
    }
}

/// Trigger to action table registered by a scene during `create`.
#[derive(Debug)]
pub struct InputBindings<A> {
    bindings: Vec<(Trigger, A)>,
}

impl<A> Default for InputBindings<A> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }
}

impl<A: Copy> InputBindings<A> {
    pub fn on(&mut self, trigger: Trigger, action: A) {
        self.bindings.push((trigger, action));
    }

    /// Actions bound to `trigger`, in registration order.
    pub fn actions_for(&self, trigger: Trigger) -> Vec<A> {
        self.bindings
            .iter()
            .filter(|(t, _)| *t == trigger)
            .map(|(_, a)| *a)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}
