use std::collections::HashMap;

use super::dto::{QnaData, QnaId, QnaItem, UpdateTarget};

pub const ITEMS_PER_PAGE: usize = 50;

/// Expansion-map key reserved for the deep-linked item outside the list.
pub const HIGHLIGHTED_KEY: &str = "highlighted";

/// Everything the QnA list view reads. One writer ([`ListState::apply`]),
/// created once per view and reset in place when the topic or filter changes.
#[derive(Clone, Debug, PartialEq)]
pub struct ListState {
    pub count: usize,
    pub items: Vec<QnaItem>,
    pub highlighted: Option<QnaItem>,
    pub loading: bool,
    pub first_update: bool,
    pub page: usize,
    pub fetch_more: bool,
    pub expanded_items: HashMap<String, bool>,
}

impl Default for ListState {
    fn default() -> Self {
        ListState {
            count: 0,
            items: Vec::new(),
            highlighted: None,
            loading: false,
            first_update: true,
            page: 1,
            fetch_more: false,
            expanded_items: HashMap::new(),
        }
    }
}

/// Every transition the list state understands. Adding a variant forces every
/// match site to handle it, so there is no "unknown action" failure mode at
/// runtime.
#[derive(Clone, Debug)]
pub enum Action {
    Loading,
    DataSuccess {
        items: Vec<QnaItem>,
        count: usize,
        page: usize,
    },
    HighlightedSuccess(QnaItem),
    ResetHighlighted,
    ResetData,
    UpdateQna {
        target: UpdateTarget,
        item: QnaItem,
        current_lang: String,
    },
    AddQna {
        languages: Vec<String>,
        contexts: Vec<String>,
    },
    DeleteQna {
        target: UpdateTarget,
    },
    ToggleExpandOne(HashMap<String, bool>),
    ExpandAll,
    CollapseAll,
    FetchMore,
    ToggleEnabledQna {
        target: UpdateTarget,
        enabled: bool,
    },
}

impl ListState {
    /// Applies one action synchronously. Pure bookkeeping; everything that
    /// talks to the network runs in [`super::dispatch::SaveDispatcher`]
    /// before the action gets here.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Loading => {
                self.loading = true;
            }
            Action::DataSuccess { items, count, page } => {
                if page == 1 {
                    self.items = items;
                } else {
                    self.items.extend(items);
                }
                self.count = count;
                self.page = page;
                self.loading = false;
                self.first_update = false;
                self.fetch_more = false;
            }
            Action::HighlightedSuccess(item) => {
                self.highlighted = Some(item);
                self.expanded_items
                    .insert(String::from(HIGHLIGHTED_KEY), true);
            }
            Action::ResetHighlighted => {
                self.highlighted = None;
            }
            Action::ResetData => {
                // Highlighted and loading survive a context switch.
                self.count = 0;
                self.items.clear();
                self.page = 1;
                self.first_update = true;
                self.fetch_more = false;
                self.expanded_items.clear();
            }
            Action::UpdateQna { target, item, .. } => {
                if let Some(slot) = self.target_mut(target) {
                    slot.save_error = item.save_error;
                    slot.id = item.id;
                    slot.data = item.data;
                }
            }
            Action::AddQna {
                languages,
                contexts,
            } => {
                let id = QnaId::next_local();
                let key = id.to_string();
                self.items.insert(
                    0,
                    QnaItem {
                        id,
                        key: Some(key.clone()),
                        is_new: true,
                        data: QnaData::blank_template(&languages, contexts),
                        save_error: None,
                    },
                );
                self.expanded_items.insert(key, true);
            }
            Action::DeleteQna { target } => match target {
                UpdateTarget::Highlighted => {
                    self.highlighted = None;
                }
                UpdateTarget::ByIndex(index) => {
                    if index < self.items.len() {
                        self.items.remove(index);
                    }
                }
            },
            Action::ToggleExpandOne(updates) => {
                self.expanded_items.extend(updates);
            }
            Action::ExpandAll => {
                self.expanded_items = self
                    .items
                    .iter()
                    .map(|item| (item.key_or_id(), true))
                    .collect();
            }
            Action::CollapseAll => {
                self.expanded_items.clear();
            }
            Action::FetchMore => {
                self.fetch_more = true;
            }
            Action::ToggleEnabledQna { target, enabled } => {
                if let Some(slot) = self.target_mut(target) {
                    slot.data.enabled = enabled;
                }
            }
        }
    }

    pub fn target(&self, target: UpdateTarget) -> Option<&QnaItem> {
        match target {
            UpdateTarget::Highlighted => self.highlighted.as_ref(),
            UpdateTarget::ByIndex(index) => self.items.get(index),
        }
    }

    fn target_mut(&mut self, target: UpdateTarget) -> Option<&mut QnaItem> {
        match target {
            UpdateTarget::Highlighted => self.highlighted.as_mut(),
            UpdateTarget::ByIndex(index) => self.items.get_mut(index),
        }
    }
}
