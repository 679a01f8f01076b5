//! The board controller: a single task that owns the live board.
//!
//! Views talk to it through a cloneable [`BoardHandle`]. Commands arrive
//! over an mpsc channel and are applied to the current snapshot in order.
//! Each accepted edit is published immediately and mirrored to the backend
//! on a spawned task; any failure there discards the optimistic edit by
//! refetching the whole board. Edits are last-write-wins: a new edit may be
//! applied while an earlier sync is still in flight, and nothing is queued
//! or cancelled.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use super::client::BoardApi;
use super::gesture::{DropEvent, interpret_drop};
use super::models::{BoardKey, ColumnId};
use super::state::{BoardCommand, BoardState, Trigger};
use super::sync::{SyncRequest, plan_sync};
use crate::errors::{ClientError, ControllerError, Severity};

const COMMAND_BUFFER: usize = 64;
const NOTICE_BUFFER: usize = 64;

/// What views currently have to render.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardPhase {
    Loading,
    Ready(Arc<BoardState>),
    Failed(String),
}

/// User-facing messages, the toast channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Loaded {
        cards: usize,
    },
    LoadFailed {
        message: String,
    },
    CardMoved {
        card_key: String,
        column_id: ColumnId,
    },
    SyncFailed {
        kind: &'static str,
        message: String,
        severity: Severity,
    },
    Refreshed,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Loaded { cards } => format!("Board loaded ({} cards)", cards),
            Notice::LoadFailed { message } => format!("Could not load board: {}", message),
            Notice::CardMoved {
                card_key,
                column_id,
            } => format!("Moved {} to column {}", card_key, column_id),
            Notice::SyncFailed { kind, message, .. } => {
                format!("Could not save {}: {}. Board reloaded.", kind, message)
            }
            Notice::Refreshed => "Board refreshed".to_string(),
        }
    }
}

/// Backend verdict on one synced edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Acknowledged,
    /// The edit was rejected; a resync has been started.
    Failed { message: String, severity: Severity },
}

/// Pending backend acknowledgement for an applied edit.
#[derive(Debug)]
pub struct SyncTicket {
    request: SyncRequest,
    done: oneshot::Receiver<SyncOutcome>,
}

impl SyncTicket {
    pub fn request(&self) -> &SyncRequest {
        &self.request
    }

    pub async fn outcome(self) -> Result<SyncOutcome, ControllerError> {
        self.done.await.map_err(|_| ControllerError::Stopped)
    }
}

/// Result of handing the controller a command or a drop.
#[derive(Debug)]
pub enum Applied {
    /// The drop did not map to any command.
    Ignored,
    /// The command would not change the board; nothing was sent.
    Unchanged,
    Changed(SyncTicket),
}

enum Command {
    Apply {
        command: BoardCommand,
        trigger: Trigger,
        reply: oneshot::Sender<Result<Applied, ControllerError>>,
    },
    Drop {
        event: DropEvent,
        reply: oneshot::Sender<Result<Applied, ControllerError>>,
    },
    Refresh {
        reply: oneshot::Sender<Result<Arc<BoardState>, ControllerError>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchReason {
    Initial,
    Refresh,
    Resync,
}

enum Completion {
    Fetched {
        reason: FetchReason,
        result: Result<BoardState, ClientError>,
        reply: Option<oneshot::Sender<Result<Arc<BoardState>, ControllerError>>>,
    },
    Synced {
        request: SyncRequest,
        result: Result<(), ClientError>,
        done: oneshot::Sender<SyncOutcome>,
    },
}

/// Cloneable front door to a running controller.
#[derive(Clone)]
pub struct BoardHandle {
    commands: mpsc::Sender<Command>,
    phase: watch::Receiver<BoardPhase>,
    notices: broadcast::Sender<Notice>,
}

impl BoardHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .await
            .map_err(|_| ControllerError::Stopped)?;
        rx.await.map_err(|_| ControllerError::Stopped)
    }

    /// Apply a keyboard or CLI command.
    pub async fn apply(
        &self,
        command: BoardCommand,
        trigger: Trigger,
    ) -> Result<Applied, ControllerError> {
        self.request(|reply| Command::Apply {
            command,
            trigger,
            reply,
        })
        .await?
    }

    /// Interpret a pointer drop against the current snapshot and apply it.
    pub async fn handle_drop(&self, event: DropEvent) -> Result<Applied, ControllerError> {
        self.request(|reply| Command::Drop { event, reply }).await?
    }

    /// Refetch the board and wait for the fresh snapshot.
    pub async fn refresh(&self) -> Result<Arc<BoardState>, ControllerError> {
        self.request(|reply| Command::Refresh { reply }).await?
    }

    pub fn phase(&self) -> BoardPhase {
        self.phase.borrow().clone()
    }

    /// The current snapshot, if one has loaded.
    pub fn snapshot(&self) -> Option<Arc<BoardState>> {
        match &*self.phase.borrow() {
            BoardPhase::Ready(state) => Some(state.clone()),
            _ => None,
        }
    }

    /// Wait for the initial load to settle.
    pub async fn wait_until_loaded(&self) -> Result<Arc<BoardState>, ControllerError> {
        let mut phase = self.phase.clone();
        let settled = phase
            .wait_for(|p| !matches!(p, BoardPhase::Loading))
            .await
            .map_err(|_| ControllerError::Stopped)?;
        match &*settled {
            BoardPhase::Ready(state) => Ok(state.clone()),
            BoardPhase::Failed(message) => Err(ControllerError::LoadFailed(message.clone())),
            BoardPhase::Loading => Err(ControllerError::NotLoaded),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub fn watch(&self) -> watch::Receiver<BoardPhase> {
        self.phase.clone()
    }
}

pub struct BoardController {
    api: Arc<dyn BoardApi>,
    key: BoardKey,
    state: Option<Arc<BoardState>>,
    phase: watch::Sender<BoardPhase>,
    notices: broadcast::Sender<Notice>,
    completions: mpsc::UnboundedSender<Completion>,
}

impl BoardController {
    /// Start a controller for `key` and begin the initial fetch.
    ///
    /// The task runs until every handle has been dropped.
    pub fn spawn(api: Arc<dyn BoardApi>, key: BoardKey) -> BoardHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (phase_tx, phase_rx) = watch::channel(BoardPhase::Loading);
        let (notice_tx, _) = broadcast::channel(NOTICE_BUFFER);

        let controller = BoardController {
            api,
            key,
            state: None,
            phase: phase_tx,
            notices: notice_tx.clone(),
            completions: completion_tx,
        };
        tokio::spawn(controller.run(command_rx, completion_rx));

        BoardHandle {
            commands: command_tx,
            phase: phase_rx,
            notices: notice_tx,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        info!(
            project_id = self.key.project_id,
            workflow_id = self.key.workflow_id,
            "board controller started"
        );
        self.start_fetch(FetchReason::Initial, None);

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(completion) = completions.recv() => self.handle_completion(completion),
            }
        }
        debug!("board controller stopped");
    }

    fn notify(&self, notice: Notice) {
        // No subscribers is fine.
        let _ = self.notices.send(notice);
    }

    fn publish(&mut self, state: BoardState) -> Arc<BoardState> {
        let state = Arc::new(state);
        self.state = Some(state.clone());
        self.phase.send_replace(BoardPhase::Ready(state.clone()));
        state
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Apply {
                command,
                trigger,
                reply,
            } => {
                let _ = reply.send(self.apply(&command, trigger));
            }
            Command::Drop { event, reply } => {
                let result = match self.state.clone() {
                    None => Err(ControllerError::NotLoaded),
                    Some(state) => match interpret_drop(&state, &event) {
                        Some(command) => self.apply(&command, Trigger::Pointer),
                        None => {
                            debug!(?event, "drop ignored");
                            Ok(Applied::Ignored)
                        }
                    },
                };
                let _ = reply.send(result);
            }
            Command::Refresh { reply } => self.start_fetch(FetchReason::Refresh, Some(reply)),
        }
    }

    fn apply(
        &mut self,
        command: &BoardCommand,
        trigger: Trigger,
    ) -> Result<Applied, ControllerError> {
        let current = self.state.clone().ok_or(ControllerError::NotLoaded)?;
        let next = match current.apply(command, trigger) {
            Ok(Some(next)) => next,
            Ok(None) => {
                debug!(?command, "command leaves board unchanged");
                return Ok(Applied::Unchanged);
            }
            Err(e) => {
                error!(error = %e, ?command, "rejected board command");
                return Err(e.into());
            }
        };

        let request = plan_sync(&next, &self.key);
        self.publish(next);
        match request {
            Some(request) => Ok(Applied::Changed(self.start_sync(request))),
            None => {
                error!(?command, "applied edit has no backend call");
                Ok(Applied::Unchanged)
            }
        }
    }

    fn start_sync(&self, request: SyncRequest) -> SyncTicket {
        let (done_tx, done_rx) = oneshot::channel();
        let api = self.api.clone();
        let completions = self.completions.clone();
        let ticket = SyncTicket {
            request: request.clone(),
            done: done_rx,
        };
        tokio::spawn(async move {
            let result = api.send(&request).await;
            let _ = completions.send(Completion::Synced {
                request,
                result,
                done: done_tx,
            });
        });
        ticket
    }

    fn start_fetch(
        &self,
        reason: FetchReason,
        reply: Option<oneshot::Sender<Result<Arc<BoardState>, ControllerError>>>,
    ) {
        let api = self.api.clone();
        let key = self.key;
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = api.fetch_board(&key).await;
            let _ = completions.send(Completion::Fetched {
                reason,
                result,
                reply,
            });
        });
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Fetched {
                reason,
                result,
                reply,
            } => self.finish_fetch(reason, result, reply),
            Completion::Synced {
                request,
                result,
                done,
            } => self.finish_sync(request, result, done),
        }
    }

    fn finish_fetch(
        &mut self,
        reason: FetchReason,
        result: Result<BoardState, ClientError>,
        reply: Option<oneshot::Sender<Result<Arc<BoardState>, ControllerError>>>,
    ) {
        let outcome = match result {
            Ok(state) => {
                let cards = state.card_count();
                let state = self.publish(state);
                info!(?reason, cards, "board fetched");
                self.notify(match reason {
                    FetchReason::Initial => Notice::Loaded { cards },
                    FetchReason::Refresh | FetchReason::Resync => Notice::Refreshed,
                });
                Ok(state)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(?reason, error = %message, "board fetch failed");
                // A failed refetch keeps whatever snapshot is already shown.
                if self.state.is_none() {
                    self.phase.send_replace(BoardPhase::Failed(message.clone()));
                }
                self.notify(Notice::LoadFailed {
                    message: message.clone(),
                });
                Err(ControllerError::LoadFailed(message))
            }
        };
        if let Some(reply) = reply {
            let _ = reply.send(outcome);
        }
    }

    fn finish_sync(
        &mut self,
        request: SyncRequest,
        result: Result<(), ClientError>,
        done: oneshot::Sender<SyncOutcome>,
    ) {
        match result {
            Ok(()) => {
                debug!(kind = request.kind(), %request, "edit acknowledged");
                if let SyncRequest::MoveCard { card_key, body, .. } = &request {
                    self.notify(Notice::CardMoved {
                        card_key: card_key.clone(),
                        column_id: ColumnId(body.target_status_id),
                    });
                }
                let _ = done.send(SyncOutcome::Acknowledged);
            }
            Err(e) => {
                let severity = e.severity();
                let message = e.to_string();
                warn!(
                    kind = request.kind(),
                    %request,
                    error = %message,
                    ?severity,
                    "edit rejected, resyncing board"
                );
                self.notify(Notice::SyncFailed {
                    kind: request.kind(),
                    message: message.clone(),
                    severity,
                });
                self.start_fetch(FetchReason::Resync, None);
                let _ = done.send(SyncOutcome::Failed { message, severity });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::backend::BoardStore;
    use crate::board::gesture::{DragSource, DropTarget, Edge};
    use crate::errors::{BackendError, BoardError};

    const KEY: BoardKey = BoardKey {
        project_id: 1,
        workflow_id: 1,
    };

    /// In-memory backend with failure injection.
    struct FakeApi {
        store: Mutex<BoardStore>,
        sends: AtomicUsize,
        fail_sends: AtomicBool,
        fail_fetches: AtomicBool,
    }

    impl FakeApi {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                store: Mutex::new(BoardStore::demo()),
                sends: AtomicUsize::new(0),
                fail_sends: AtomicBool::new(false),
                fail_fetches: AtomicBool::new(false),
            })
        }

        fn server_board(&self) -> crate::board::models::BoardResponse {
            self.store.lock().unwrap().board(KEY.workflow_id).unwrap()
        }
    }

    fn client_error(err: BackendError) -> ClientError {
        match err {
            BackendError::NotFound(m) => ClientError::NotFound(m),
            BackendError::BadRequest(m) => ClientError::Validation(m),
            BackendError::Conflict(m) => ClientError::Conflict(m),
        }
    }

    #[async_trait]
    impl BoardApi for FakeApi {
        async fn fetch_board(&self, key: &BoardKey) -> Result<BoardState, ClientError> {
            if self.fail_fetches.load(Ordering::SeqCst) {
                return Err(ClientError::Api {
                    status: 503,
                    message: "unavailable".into(),
                });
            }
            let board = self
                .store
                .lock()
                .unwrap()
                .board(key.workflow_id)
                .map_err(client_error)?;
            Ok(BoardState::from_response(board)?)
        }

        async fn send(&self, request: &SyncRequest) -> Result<(), ClientError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            if self.fail_sends.load(Ordering::SeqCst) {
                return Err(ClientError::Api {
                    status: 500,
                    message: "boom".into(),
                });
            }
            let mut store = self.store.lock().unwrap();
            let result = match request {
                SyncRequest::ReorderColumns { board_id, body, .. } => {
                    store.reorder_columns(*board_id, &body.ordered_column_ids)
                }
                SyncRequest::ReorderCards {
                    column_id, body, ..
                } => store.reorder_cards(column_id.get(), &body.ordered_issue_ids),
                SyncRequest::MoveCard { card_id, body, .. } => {
                    store.move_card(*card_id, body.target_status_id, body.target_index)
                }
            };
            result.map_err(client_error)
        }
    }

    async fn next_notice(rx: &mut broadcast::Receiver<Notice>) -> Notice {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for notice")
            .expect("notice channel closed")
    }

    fn keys(state: &BoardState, column: i64) -> Vec<String> {
        state
            .column(ColumnId(column))
            .unwrap()
            .items
            .iter()
            .map(|c| c.key.clone())
            .collect()
    }

    async fn loaded(api: Arc<FakeApi>) -> (BoardHandle, broadcast::Receiver<Notice>) {
        let handle = BoardController::spawn(api, KEY);
        let mut notices = handle.subscribe();
        handle.wait_until_loaded().await.unwrap();
        assert_eq!(next_notice(&mut notices).await, Notice::Loaded { cards: 5 });
        (handle, notices)
    }

    #[tokio::test]
    async fn test_initial_load_publishes_snapshot() {
        let api = FakeApi::new();
        let (handle, _notices) = loaded(api.clone()).await;
        let state = handle.snapshot().unwrap();
        assert_eq!(state.to_response(), api.server_board());
        assert!(matches!(handle.phase(), BoardPhase::Ready(_)));
    }

    #[tokio::test]
    async fn test_move_card_is_optimistic_and_acknowledged() {
        let api = FakeApi::new();
        let (handle, mut notices) = loaded(api.clone()).await;

        let applied = handle
            .apply(
                BoardCommand::MoveCard {
                    start_column_id: ColumnId(1),
                    finish_column_id: ColumnId(2),
                    item_index_in_start_column: 0,
                    item_index_in_finish_column: Some(0),
                },
                Trigger::Keyboard,
            )
            .await
            .unwrap();
        let Applied::Changed(ticket) = applied else {
            panic!("expected a change");
        };

        // Published before the backend answers.
        let local = handle.snapshot().unwrap();
        assert_eq!(keys(&local, 2), vec!["DEMO-1", "DEMO-4"]);
        assert!(!keys(&local, 1).contains(&"DEMO-1".to_string()));

        assert_eq!(ticket.outcome().await.unwrap(), SyncOutcome::Acknowledged);
        assert_eq!(
            next_notice(&mut notices).await,
            Notice::CardMoved {
                card_key: "DEMO-1".into(),
                column_id: ColumnId(2)
            }
        );
        assert_eq!(local.to_response(), api.server_board());
    }

    #[tokio::test]
    async fn test_failed_sync_resyncs_to_server_truth() {
        let api = FakeApi::new();
        let (handle, mut notices) = loaded(api.clone()).await;
        api.fail_sends.store(true, Ordering::SeqCst);

        let Applied::Changed(ticket) = handle
            .apply(
                BoardCommand::ReorderColumn {
                    start_index: 0,
                    finish_index: 2,
                },
                Trigger::Keyboard,
            )
            .await
            .unwrap()
        else {
            panic!("expected a change");
        };
        assert!(matches!(
            ticket.outcome().await.unwrap(),
            SyncOutcome::Failed {
                severity: Severity::Transient,
                ..
            }
        ));
        assert!(matches!(
            next_notice(&mut notices).await,
            Notice::SyncFailed {
                kind: "column-reorder",
                ..
            }
        ));
        assert_eq!(next_notice(&mut notices).await, Notice::Refreshed);

        let state = handle.snapshot().unwrap();
        assert_eq!(state.to_response(), api.server_board());
        assert_eq!(state.last_operation(), None);
    }

    #[tokio::test]
    async fn test_rejected_move_reports_not_found() {
        let api = FakeApi::new();
        let (handle, mut notices) = loaded(api.clone()).await;
        // The destination disappears on the server after the board loaded.
        {
            let mut store = api.store.lock().unwrap();
            store.move_card(5, 1, 3).unwrap();
            store.delete_status(3).unwrap();
        }

        let Applied::Changed(ticket) = handle
            .apply(
                BoardCommand::MoveCard {
                    start_column_id: ColumnId(2),
                    finish_column_id: ColumnId(3),
                    item_index_in_start_column: 0,
                    item_index_in_finish_column: None,
                },
                Trigger::Keyboard,
            )
            .await
            .unwrap()
        else {
            panic!("expected a change");
        };
        assert!(matches!(
            ticket.outcome().await.unwrap(),
            SyncOutcome::Failed {
                severity: Severity::Rejected,
                ..
            }
        ));
        assert!(matches!(
            next_notice(&mut notices).await,
            Notice::SyncFailed { .. }
        ));
        assert_eq!(next_notice(&mut notices).await, Notice::Refreshed);
        let state = handle.snapshot().unwrap();
        assert_eq!(state.to_response(), api.server_board());
        assert_eq!(state.ordered_column_ids().len(), 2);
    }

    #[tokio::test]
    async fn test_noop_reorder_sends_nothing() {
        let api = FakeApi::new();
        let (handle, _notices) = loaded(api.clone()).await;
        let before = handle.snapshot().unwrap();

        let applied = handle
            .apply(
                BoardCommand::ReorderColumn {
                    start_index: 1,
                    finish_index: 1,
                },
                Trigger::Keyboard,
            )
            .await
            .unwrap();
        assert!(matches!(applied, Applied::Unchanged));
        assert_eq!(api.sends.load(Ordering::SeqCst), 0);
        assert!(Arc::ptr_eq(&before, &handle.snapshot().unwrap()));
    }

    #[tokio::test]
    async fn test_out_of_range_command_keeps_state() {
        let api = FakeApi::new();
        let (handle, _notices) = loaded(api.clone()).await;
        let before = handle.snapshot().unwrap();

        let err = handle
            .apply(
                BoardCommand::ReorderCard {
                    column_id: ColumnId(1),
                    start_index: 0,
                    finish_index: 9,
                },
                Trigger::Keyboard,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Board(BoardError::IndexOutOfRange { index: 9, .. })
        ));
        assert!(Arc::ptr_eq(&before, &handle.snapshot().unwrap()));
        assert_eq!(api.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_drop_on_bottom_edge_lands_after_target() {
        let api = FakeApi::new();
        let (handle, _notices) = loaded(api.clone()).await;

        let applied = handle
            .handle_drop(DropEvent {
                source: DragSource::Card {
                    card_key: "DEMO-5".into(),
                    column_id: ColumnId(3),
                },
                targets: vec![
                    DropTarget::Card {
                        card_key: "DEMO-2".into(),
                        column_id: ColumnId(1),
                        closest_edge: Some(Edge::Bottom),
                    },
                    DropTarget::Column {
                        column_id: ColumnId(1),
                        closest_edge: None,
                    },
                ],
            })
            .await
            .unwrap();
        let Applied::Changed(ticket) = applied else {
            panic!("expected a change");
        };
        assert_eq!(ticket.outcome().await.unwrap(), SyncOutcome::Acknowledged);

        let state = handle.snapshot().unwrap();
        assert_eq!(keys(&state, 1), vec!["DEMO-1", "DEMO-2", "DEMO-5", "DEMO-3"]);
        assert_eq!(state.to_response(), api.server_board());
    }

    #[tokio::test]
    async fn test_drop_outside_board_is_ignored() {
        let api = FakeApi::new();
        let (handle, _notices) = loaded(api).await;
        let applied = handle
            .handle_drop(DropEvent {
                source: DragSource::Column {
                    column_id: ColumnId(1),
                },
                targets: vec![],
            })
            .await
            .unwrap();
        assert!(matches!(applied, Applied::Ignored));
    }

    #[tokio::test]
    async fn test_load_failure_is_reported() {
        let api = FakeApi::new();
        api.fail_fetches.store(true, Ordering::SeqCst);
        let handle = BoardController::spawn(api, KEY);

        let err = handle.wait_until_loaded().await.unwrap_err();
        assert!(matches!(err, ControllerError::LoadFailed(_)));
        assert!(matches!(handle.phase(), BoardPhase::Failed(_)));

        let err = handle
            .apply(
                BoardCommand::ReorderColumn {
                    start_index: 0,
                    finish_index: 1,
                },
                Trigger::Keyboard,
            )
            .await
            .unwrap_err();
        assert_eq!(err, ControllerError::NotLoaded);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_server_changes() {
        let api = FakeApi::new();
        let (handle, mut notices) = loaded(api.clone()).await;
        api.store.lock().unwrap().reorder_columns(1, &[2, 3, 1]).unwrap();

        let state = handle.refresh().await.unwrap();
        assert_eq!(
            state.ordered_column_ids(),
            &[ColumnId(2), ColumnId(3), ColumnId(1)]
        );
        assert_eq!(next_notice(&mut notices).await, Notice::Refreshed);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_current_snapshot() {
        let api = FakeApi::new();
        let (handle, _notices) = loaded(api.clone()).await;
        let before = handle.snapshot().unwrap();
        api.fail_fetches.store(true, Ordering::SeqCst);

        let err = handle.refresh().await.unwrap_err();
        assert!(matches!(err, ControllerError::LoadFailed(_)));
        assert!(Arc::ptr_eq(&before, &handle.snapshot().unwrap()));
    }

    #[test]
    fn test_notice_messages() {
        assert_eq!(
            Notice::CardMoved {
                card_key: "A-1".into(),
                column_id: ColumnId(4)
            }
            .message(),
            "Moved A-1 to column 4"
        );
        assert!(
            Notice::SyncFailed {
                kind: "card-move",
                message: "Not found: gone".into(),
                severity: Severity::Rejected
            }
            .message()
            .contains("card-move")
        );
    }
}
