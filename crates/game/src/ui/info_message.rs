use std::collections::VecDeque;

use engine::Millis;
use tracing::info;

const MAX_MESSAGES: usize = 3;
const MESSAGE_TTL: Millis = Millis(5000);

#[derive(Debug, Clone, PartialEq, Eq)]
struct TimedMessage {
    text: String,
    remaining: Millis,
}

/// Short-lived messages stacked in the corner of the HUD; oldest drops first.
#[derive(Debug, Default)]
pub(crate) struct InfoMessage {
    messages: VecDeque<TimedMessage>,
}

impl InfoMessage {
    pub(crate) fn enqueue(&mut self, text: impl Into<String>) {
        if self.messages.len() == MAX_MESSAGES {
            self.messages.pop_front();
        }
        self.messages.push_back(TimedMessage {
            text: text.into(),
            remaining: MESSAGE_TTL,
        });
        if let Some(shown) = self.messages.back() {
            info!(text = %shown.text, "info_message_shown");
        }
    }

    pub(crate) fn tick(&mut self, time_passed: Millis) {
        for message in &mut self.messages {
            message.remaining = message.remaining.saturating_sub(time_passed);
        }
        self.messages.retain(|message| message.remaining > Millis::ZERO);
    }

    pub(crate) fn clear_messages(&mut self) {
        self.messages.clear();
    }

    #[cfg(test)]
    pub(crate) fn messages(&self) -> Vec<&str> {
        self.messages
            .iter()
            .map(|message| message.text.as_str())
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
