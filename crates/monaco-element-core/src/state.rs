//! Editor state mirrored on both sides of the frame boundary.

use smol_str::SmolStr;

use crate::protocol::Message;

pub const DEFAULT_LANGUAGE: &str = "javascript";
pub const DEFAULT_THEME: &str = "vs-dark";

/// One endpoint's copy of the editor state.
///
/// Each side holds its own copy; the protocol keeps them eventually
/// consistent. The host copy wins for attributes set on the element, the
/// sandbox copy wins for edits typed into the editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorState {
    pub value: String,
    pub language: SmolStr,
    pub theme: SmolStr,
    pub autogrow: bool,
    pub min_height: Option<u32>,
    pub max_height: Option<u32>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            value: String::new(),
            language: SmolStr::new_static(DEFAULT_LANGUAGE),
            theme: SmolStr::new_static(DEFAULT_THEME),
            autogrow: false,
            min_height: None,
            max_height: None,
        }
    }
}

/// A synchronized field of [`EditorState`].
///
/// The declaration order is the order fields are pushed to the sandbox: value
/// goes first so the engine does not re-highlight stale text after a
/// language switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateField {
    Value,
    Language,
    Theme,
    Autogrow,
    MinHeight,
    MaxHeight,
}

impl StateField {
    pub const ALL: [StateField; 6] = [
        StateField::Value,
        StateField::Language,
        StateField::Theme,
        StateField::Autogrow,
        StateField::MinHeight,
        StateField::MaxHeight,
    ];
}

impl EditorState {
    /// The `*Changed` message carrying the current value of `field`.
    pub fn message_for(&self, field: StateField) -> Message {
        match field {
            StateField::Value => Message::ValueChanged(self.value.clone()),
            StateField::Language => Message::LanguageChanged(self.language.clone()),
            StateField::Theme => Message::ThemeChanged(self.theme.clone()),
            StateField::Autogrow => Message::AutogrowChanged(self.autogrow),
            StateField::MinHeight => Message::MinHeightChanged(self.min_height),
            StateField::MaxHeight => Message::MaxHeightChanged(self.max_height),
        }
    }

    /// Full state as an ordered batch of messages.
    pub fn sync_messages(&self) -> Vec<Message> {
        StateField::ALL
            .into_iter()
            .map(|field| self.message_for(field))
            .collect()
    }

    /// Apply a state-carrying message. Returns which field changed, if any.
    ///
    /// Messages that carry no state (`ready`, `heightChanged`, `loadFailed`)
    /// leave the state untouched.
    pub fn apply(&mut self, msg: &Message) -> Option<StateField> {
        match msg {
            Message::ValueChanged(value) => {
                replace(&mut self.value, value.clone()).then_some(StateField::Value)
            }
            Message::LanguageChanged(id) => {
                replace(&mut self.language, id.clone()).then_some(StateField::Language)
            }
            Message::ThemeChanged(id) => {
                replace(&mut self.theme, id.clone()).then_some(StateField::Theme)
            }
            Message::AutogrowChanged(on) => {
                replace(&mut self.autogrow, *on).then_some(StateField::Autogrow)
            }
            Message::MinHeightChanged(bound) => {
                replace(&mut self.min_height, *bound).then_some(StateField::MinHeight)
            }
            Message::MaxHeightChanged(bound) => {
                replace(&mut self.max_height, *bound).then_some(StateField::MaxHeight)
            }
            Message::Ready | Message::HeightChanged(_) | Message::LoadFailed(_) => None,
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, new: T) -> bool {
    if *slot == new {
        false
    } else {
        *slot = new;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = EditorState::default();
        assert_eq!(state.language, "javascript");
        assert_eq!(state.theme, "vs-dark");
        assert!(!state.autogrow);
        assert_eq!(state.max_height, None);
    }

    #[test]
    fn test_sync_messages_value_first() {
        let state = EditorState {
            value: "print(1)".into(),
            language: "python".into(),
            ..Default::default()
        };
        let kinds: Vec<_> = state.sync_messages().iter().map(|m| m.kind().as_str()).collect();
        assert_eq!(
            kinds,
            [
                "valueChanged",
                "languageChanged",
                "themeChanged",
                "autogrowChanged",
                "minHeightChanged",
                "maxHeightChanged"
            ]
        );
    }

    #[test]
    fn test_apply_reports_changed_field() {
        let mut state = EditorState::default();
        assert_eq!(
            state.apply(&Message::ThemeChanged("vs".into())),
            Some(StateField::Theme)
        );
        assert_eq!(state.apply(&Message::ThemeChanged("vs".into())), None);
        assert_eq!(state.apply(&Message::HeightChanged(40)), None);
        assert_eq!(state, EditorState { theme: "vs".into(), ..Default::default() });
    }
}
