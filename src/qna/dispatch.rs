use std::collections::HashMap;

use log::warn;

use super::client::QnaClient;
use super::dto::{QnaData, QnaId, UpdateTarget};
use super::state::{Action, ListState};
use super::validate::validate;
use crate::result::Error;

type RefreshQnaCount = Box<dyn Fn() + Send + Sync>;

/// Async middleware in front of [`ListState`]. Save, enabled-toggle and
/// delete actions talk to the server here; whatever comes back is folded into
/// the action before the store reduces it. Every action is reduced exactly
/// once, network failure or not.
pub struct SaveDispatcher {
    client: QnaClient,
    refresh_qna_count: Option<RefreshQnaCount>,
}

impl SaveDispatcher {
    pub fn new(client: QnaClient) -> Self {
        SaveDispatcher {
            client,
            refresh_qna_count: None,
        }
    }

    /// Registers the out-of-band counter refresh invoked after create and
    /// delete.
    pub fn with_refresh(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.refresh_qna_count = Some(Box::new(f));
        self
    }

    pub async fn apply(&self, state: &mut ListState, action: Action) {
        match action {
            Action::UpdateQna {
                target,
                item,
                current_lang,
            } => {
                let item = self.save(item, &current_lang).await;
                state.apply(Action::UpdateQna {
                    target,
                    item,
                    current_lang,
                });
            }
            Action::ToggleEnabledQna { target, .. } => {
                let enabled = self.toggle_enabled(state, target).await;
                state.apply(Action::ToggleEnabledQna { target, enabled });
            }
            Action::DeleteQna { target } => {
                self.delete_remote(state, target);
                self.refresh();
                state.apply(Action::DeleteQna { target });
            }
            other => state.apply(other),
        }
    }

    /// Persists one item. Validation failures skip the network entirely and
    /// hand the item back untouched; the editor shows those errors itself,
    /// not through `save_error`.
    async fn save(
        &self,
        mut item: super::dto::QnaItem,
        current_lang: &str,
    ) -> super::dto::QnaItem {
        if !validate(&item, current_lang).is_empty() {
            return item;
        }
        let clean = sanitize(&item.data);
        match item.id.clone() {
            QnaId::Local(_) => match self.client.create(&clean).await {
                Ok(new_id) => {
                    item.id = QnaId::Remote(new_id);
                    item.save_error = None;
                    self.refresh();
                }
                Err(e) => {
                    item.save_error = Some(save_error_message(e));
                }
            },
            QnaId::Remote(id) => match self.client.update(&id, &clean).await {
                Ok(()) => {
                    item.save_error = None;
                }
                Err(e) => {
                    item.save_error = Some(save_error_message(e));
                }
            },
        }
        item
    }

    /// Flips `enabled` optimistically and returns the value the store should
    /// apply. Persisted items push the flip to the server and revert on
    /// failure; local items have nothing to persist yet and keep the flip.
    async fn toggle_enabled(&self, state: &ListState, target: UpdateTarget) -> bool {
        let item = match state.target(target) {
            Some(item) => item,
            None => return false,
        };
        let original = item.data.enabled;
        let flipped = !original;
        match &item.id {
            QnaId::Local(_) => flipped,
            QnaId::Remote(id) => {
                let mut data = item.data.clone();
                data.enabled = flipped;
                match self.client.update(id, &data).await {
                    Ok(()) => flipped,
                    Err(e) => {
                        warn!("Toggling {} failed, reverting: {}", id, e);
                        original
                    }
                }
            }
        }
    }

    /// Fires the best-effort server delete for persisted items. Never
    /// awaited: the view drops the item no matter what the server says, and a
    /// failed delete is not rolled back.
    fn delete_remote(&self, state: &ListState, target: UpdateTarget) {
        let id = match state.target(target) {
            Some(item) => match &item.id {
                QnaId::Remote(id) => id.clone(),
                QnaId::Local(_) => return,
            },
            None => return,
        };
        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(e) = client.delete(&id).await {
                warn!("Deleting {} on the server failed: {}", id, e);
            }
        });
    }

    fn refresh(&self) {
        if let Some(f) = &self.refresh_qna_count {
            f();
        }
    }
}

/// Save payload: every language's questions and answers with blank entries
/// dropped. Rich content and redirects go out as-is.
fn sanitize(data: &QnaData) -> QnaData {
    let drop_blanks = |entries: &HashMap<String, Vec<String>>| -> HashMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(lang, list)| {
                let kept: Vec<String> = list
                    .iter()
                    .filter(|entry| !entry.trim().is_empty())
                    .cloned()
                    .collect();
                (lang.clone(), kept)
            })
            .collect()
    };
    QnaData {
        questions: drop_blanks(&data.questions),
        answers: drop_blanks(&data.answers),
        ..data.clone()
    }
}

fn save_error_message(e: Error) -> String {
    match e {
        Error::ErrorWithMessage(m) => m,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    use super::*;
    use crate::qna::dto::{QnaData, QnaItem};

    #[derive(Clone, Default)]
    struct Hits {
        create: Arc<AtomicUsize>,
        update: Arc<AtomicUsize>,
        delete: Arc<AtomicUsize>,
    }

    async fn spawn_backend(fail_writes: bool) -> (String, Hits) {
        let _ = env_logger::builder().is_test(true).try_init();
        let hits = Hits::default();
        let create_hits = hits.clone();
        let update_hits = hits.clone();
        let delete_hits = hits.clone();

        let router = Router::new()
            .route(
                "/mod/qna/questions",
                post(move |State(fail): State<bool>| {
                    create_hits.create.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if fail {
                            (
                                StatusCode::BAD_REQUEST,
                                Json(serde_json::json!({"message": "Questions must be unique"})),
                            )
                        } else {
                            (
                                StatusCode::OK,
                                Json(serde_json::json!(["persisted-1"])),
                            )
                        }
                    }
                }),
            )
            .route(
                "/mod/qna/questions/:id",
                post(move |State(fail): State<bool>| {
                    update_hits.update.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if fail {
                            (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                Json(serde_json::json!({"message": "Update rejected"})),
                            )
                        } else {
                            (StatusCode::OK, Json(serde_json::json!(null)))
                        }
                    }
                }),
            )
            .route(
                "/mod/qna/questions/:id/delete",
                post(move || {
                    delete_hits.delete.fetch_add(1, Ordering::SeqCst);
                    async { StatusCode::OK }
                }),
            )
            .with_state(fail_writes);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{}", addr), hits)
    }

    fn valid_item(id: QnaId) -> QnaItem {
        let langs = vec![String::from("en")];
        let mut data = QnaData::blank_template(&langs, vec![]);
        data.questions.insert(
            String::from("en"),
            vec![String::from("How do I reset my password?"), String::new()],
        );
        data.answers.insert(
            String::from("en"),
            vec![String::from("Use the forgot-password link.")],
        );
        QnaItem {
            id,
            key: None,
            is_new: false,
            data,
            save_error: None,
        }
    }

    fn update_action(target: UpdateTarget, item: QnaItem) -> Action {
        Action::UpdateQna {
            target,
            item,
            current_lang: String::from("en"),
        }
    }

    #[tokio::test]
    async fn successful_create_adopts_the_server_id() {
        let (base, hits) = spawn_backend(false).await;
        let refreshes = Arc::new(AtomicUsize::new(0));
        let counter = refreshes.clone();
        let dispatcher = SaveDispatcher::new(QnaClient::new(&base).unwrap())
            .with_refresh(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        let mut state = ListState::default();
        state.items = vec![valid_item(QnaId::Local(41))];
        let item = state.items[0].clone();
        dispatcher
            .apply(&mut state, update_action(UpdateTarget::ByIndex(0), item))
            .await;

        assert_eq!(state.items[0].id, QnaId::Remote(String::from("persisted-1")));
        assert!(state.items[0].save_error.is_none());
        assert_eq!(hits.create.load(Ordering::SeqCst), 1);
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_create_keeps_the_local_id_and_captures_the_message() {
        let (base, hits) = spawn_backend(true).await;
        let dispatcher = SaveDispatcher::new(QnaClient::new(&base).unwrap());

        let mut state = ListState::default();
        state.items = vec![valid_item(QnaId::Local(42))];
        let item = state.items[0].clone();
        dispatcher
            .apply(&mut state, update_action(UpdateTarget::ByIndex(0), item))
            .await;

        assert_eq!(state.items[0].id, QnaId::Local(42));
        assert_eq!(
            state.items[0].save_error.as_deref(),
            Some("Questions must be unique")
        );
        assert_eq!(hits.create.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_item_never_reaches_the_network() {
        let (base, hits) = spawn_backend(false).await;
        let dispatcher = SaveDispatcher::new(QnaClient::new(&base).unwrap());

        let mut state = ListState::default();
        let mut item = valid_item(QnaId::Local(43));
        item.data
            .questions
            .insert(String::from("en"), vec![String::new()]);
        state.items = vec![item.clone()];
        dispatcher
            .apply(&mut state, update_action(UpdateTarget::ByIndex(0), item))
            .await;

        assert_eq!(state.items[0].id, QnaId::Local(43));
        assert!(state.items[0].save_error.is_none());
        assert_eq!(hits.create.load(Ordering::SeqCst), 0);
        assert_eq!(hits.update.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_update_sets_save_error_and_keeps_the_id() {
        let (base, hits) = spawn_backend(true).await;
        let dispatcher = SaveDispatcher::new(QnaClient::new(&base).unwrap());

        let mut state = ListState::default();
        state.items = vec![valid_item(QnaId::Remote(String::from("abc")))];
        let item = state.items[0].clone();
        dispatcher
            .apply(&mut state, update_action(UpdateTarget::ByIndex(0), item))
            .await;

        assert_eq!(state.items[0].id, QnaId::Remote(String::from("abc")));
        assert_eq!(state.items[0].save_error.as_deref(), Some("Update rejected"));
        assert_eq!(hits.update.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn update_to_the_highlighted_slot_stays_there() {
        let (base, _hits) = spawn_backend(false).await;
        let dispatcher = SaveDispatcher::new(QnaClient::new(&base).unwrap());

        let mut state = ListState::default();
        state.apply(Action::HighlightedSuccess(valid_item(QnaId::Remote(
            String::from("deep"),
        ))));
        let item = state.highlighted.clone().unwrap();
        dispatcher
            .apply(&mut state, update_action(UpdateTarget::Highlighted, item))
            .await;

        assert!(state.highlighted.as_ref().unwrap().save_error.is_none());
        assert!(state.items.is_empty());
    }

    #[tokio::test]
    async fn toggle_on_a_persisted_item_survives_a_successful_save() {
        let (base, hits) = spawn_backend(false).await;
        let dispatcher = SaveDispatcher::new(QnaClient::new(&base).unwrap());

        let mut state = ListState::default();
        state.items = vec![valid_item(QnaId::Remote(String::from("abc")))];
        dispatcher
            .apply(
                &mut state,
                Action::ToggleEnabledQna {
                    target: UpdateTarget::ByIndex(0),
                    enabled: false,
                },
            )
            .await;

        assert!(!state.items[0].data.enabled);
        assert_eq!(hits.update.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn toggle_reverts_when_the_server_rejects_it() {
        let (base, hits) = spawn_backend(true).await;
        let dispatcher = SaveDispatcher::new(QnaClient::new(&base).unwrap());

        let mut state = ListState::default();
        state.items = vec![valid_item(QnaId::Remote(String::from("abc")))];
        dispatcher
            .apply(
                &mut state,
                Action::ToggleEnabledQna {
                    target: UpdateTarget::ByIndex(0),
                    enabled: false,
                },
            )
            .await;

        assert!(state.items[0].data.enabled);
        assert_eq!(hits.update.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn toggle_on_a_local_item_skips_the_network() {
        let (base, hits) = spawn_backend(false).await;
        let dispatcher = SaveDispatcher::new(QnaClient::new(&base).unwrap());

        let mut state = ListState::default();
        state.items = vec![valid_item(QnaId::Local(44))];
        dispatcher
            .apply(
                &mut state,
                Action::ToggleEnabledQna {
                    target: UpdateTarget::ByIndex(0),
                    enabled: false,
                },
            )
            .await;

        assert!(!state.items[0].data.enabled);
        assert_eq!(hits.update.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delete_removes_the_item_and_fires_the_best_effort_request() {
        let (base, hits) = spawn_backend(false).await;
        let refreshes = Arc::new(AtomicUsize::new(0));
        let counter = refreshes.clone();
        let dispatcher = SaveDispatcher::new(QnaClient::new(&base).unwrap())
            .with_refresh(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        let mut state = ListState::default();
        state.items = vec![
            valid_item(QnaId::Remote(String::from("a"))),
            valid_item(QnaId::Remote(String::from("b"))),
            valid_item(QnaId::Remote(String::from("c"))),
        ];
        dispatcher
            .apply(
                &mut state,
                Action::DeleteQna {
                    target: UpdateTarget::ByIndex(1),
                },
            )
            .await;

        let ids: Vec<String> = state.items.iter().map(|i| i.id.to_string()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);

        // The server call is spawned, give it a moment to land.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(hits.delete.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn delete_of_a_local_item_stays_client_side() {
        let (base, hits) = spawn_backend(false).await;
        let refreshes = Arc::new(AtomicUsize::new(0));
        let counter = refreshes.clone();
        let dispatcher = SaveDispatcher::new(QnaClient::new(&base).unwrap())
            .with_refresh(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        let mut state = ListState::default();
        state.items = vec![valid_item(QnaId::Local(45))];
        dispatcher
            .apply(
                &mut state,
                Action::DeleteQna {
                    target: UpdateTarget::ByIndex(0),
                },
            )
            .await;

        assert!(state.items.is_empty());
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(hits.delete.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delete_of_the_highlighted_item_clears_the_slot() {
        let (base, hits) = spawn_backend(false).await;
        let dispatcher = SaveDispatcher::new(QnaClient::new(&base).unwrap());

        let mut state = ListState::default();
        state.apply(Action::HighlightedSuccess(valid_item(QnaId::Remote(
            String::from("deep"),
        ))));
        dispatcher
            .apply(
                &mut state,
                Action::DeleteQna {
                    target: UpdateTarget::Highlighted,
                },
            )
            .await;

        assert!(state.highlighted.is_none());
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(hits.delete.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn pass_through_actions_reduce_unchanged() {
        let (base, _hits) = spawn_backend(false).await;
        let dispatcher = SaveDispatcher::new(QnaClient::new(&base).unwrap());

        let mut state = ListState::default();
        dispatcher.apply(&mut state, Action::Loading).await;
        assert!(state.loading);
        dispatcher.apply(&mut state, Action::FetchMore).await;
        assert!(state.fetch_more);
    }

    #[test]
    fn sanitize_drops_blank_entries_in_every_language() {
        let langs = vec![String::from("en"), String::from("fr")];
        let mut data = QnaData::blank_template(&langs, vec![]);
        data.questions.insert(
            String::from("en"),
            vec![String::from("q"), String::from("  "), String::new()],
        );
        data.questions
            .insert(String::from("fr"), vec![String::new()]);
        data.answers.insert(
            String::from("en"),
            vec![String::new(), String::from("a")],
        );
        let clean = sanitize(&data);
        assert_eq!(clean.questions["en"], vec!["q"]);
        assert!(clean.questions["fr"].is_empty());
        assert_eq!(clean.answers["en"], vec!["a"]);
    }
}
