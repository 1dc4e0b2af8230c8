use crate::world::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PromptId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptEntry {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptResponse {
    Canceled,
    Selected(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrompt {
    pub prompt_id: PromptId,
    pub player_id: PlayerId,
    pub response: PromptResponse,
}

#[derive(Debug, Clone)]
struct OpenPrompt {
    id: PromptId,
    player_id: PlayerId,
    entries: Vec<PromptEntry>,
}

/// Single-choice prompts with deferred responses. A prompt opened on one
/// step is resolved out-of-band and drained on a later step, so callers
/// must re-validate the world when the response arrives.
#[derive(Debug, Default)]
pub(crate) struct PromptBoard {
    next_id: u64,
    open: Vec<OpenPrompt>,
    resolved: Vec<ResolvedPrompt>,
}

impl PromptBoard {
    pub(crate) fn open(&mut self, player_id: PlayerId, entries: Vec<PromptEntry>) -> PromptId {
        let id = PromptId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.open.push(OpenPrompt {
            id,
            player_id,
            entries,
        });
        id
    }

    pub(crate) fn open_ids(&self) -> Vec<PromptId> {
        self.open.iter().map(|prompt| prompt.id).collect()
    }

    pub(crate) fn entries(&self, prompt_id: PromptId) -> Option<&[PromptEntry]> {
        self.open
            .iter()
            .find(|prompt| prompt.id == prompt_id)
            .map(|prompt| prompt.entries.as_slice())
    }

    pub(crate) fn resolve(&mut self, prompt_id: PromptId, response: PromptResponse) -> bool {
        let Some(index) = self.open.iter().position(|prompt| prompt.id == prompt_id) else {
            return false;
        };
        let prompt = self.open.remove(index);
        self.resolved.push(ResolvedPrompt {
            prompt_id,
            player_id: prompt.player_id,
            response,
        });
        true
    }

    pub(crate) fn drain_resolved(&mut self) -> Vec<ResolvedPrompt> {
        std::mem::take(&mut self.resolved)
    }
}
