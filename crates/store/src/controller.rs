//! The task that owns [`StoreState`] and the handle the shell talks to it through.

use std::{collections::VecDeque, mem, sync::Arc};

use anyhow::{Context, Result};
use client_core::{ClientError, SheetsApi};
use shared::{error::ApiError, protocol::RenameColumnRequest};
use tokio::{
    sync::{
        broadcast,
        mpsc::{self, error::TrySendError},
    },
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
    events::{StoreEvent, StoreSignal},
    reducer::{self, Change, Plan, Rejection, Request},
    state::StoreState,
};

const SIGNAL_CAPACITY: usize = 64;

pub struct Store<A> {
    api: A,
    state: StoreState,
    signals: broadcast::Sender<StoreSignal>,
}

/// Outcome of one command, before any follow-up dispatch.
struct Handled {
    render: bool,
    follow_up: Option<StoreEvent>,
}

impl<A: SheetsApi> Store<A> {
    pub fn new(api: A) -> Self {
        Self::with_state(api, StoreState::default())
    }

    pub fn with_state(api: A, state: StoreState) -> Self {
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self {
            api,
            state,
            signals,
        }
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreSignal> {
        self.signals.subscribe()
    }

    /// Runs `event` and every event it re-dispatches to completion.
    ///
    /// Failures are logged and swallowed; state is left as it was before the
    /// failing step.
    pub async fn handle(&mut self, event: StoreEvent) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            let name = event.name();
            let render_on_failure = matches!(event, StoreEvent::GetList);

            let handled = match self.process(event).await {
                Ok(handled) => handled,
                Err(err) => {
                    match err.downcast_ref::<Rejection>() {
                        Some(rejection) if matches!(rejection, Rejection::Stale { .. }) => {
                            warn!(event = name, "dropping stale command: {rejection}")
                        }
                        _ => {
                            let (status, backend) = backend_failure(&err);
                            error!(
                                event = name,
                                status,
                                code = ?backend.as_ref().map(|e| e.code),
                                message = backend.as_ref().map(|e| e.message.as_str()),
                                "store event failed: {err:#}"
                            )
                        }
                    }
                    Handled {
                        render: render_on_failure,
                        follow_up: None,
                    }
                }
            };

            if handled.render {
                self.render();
            }
            if let Some(next) = handled.follow_up {
                queue.push_back(next);
            }
        }
    }

    async fn process(&mut self, event: StoreEvent) -> Result<Handled> {
        let plan = reducer::plan(&self.state, event)?;
        let request = match plan {
            Plan::Navigate { sheet } => {
                self.apply(Change::RouteChanged {
                    sheet: sheet.clone(),
                });
                return Ok(Handled {
                    render: false,
                    follow_up: Some(StoreEvent::SelectSheet(sheet)),
                });
            }
            Plan::Send(request) => request,
        };

        let change = self.execute(request).await?;
        let follow_up = match &change {
            Change::SheetsLoaded(sheets) => {
                reducer::initial_sheet(&self.state.params, sheets).map(StoreEvent::SelectSheet)
            }
            _ => None,
        };
        self.apply(change);

        Ok(Handled {
            render: true,
            follow_up,
        })
    }

    async fn execute(&self, request: Request) -> Result<Change> {
        let change = match request {
            Request::ListSheets => {
                let sheets = self.api.list_sheets().await.context("failed to list sheets")?;
                info!(count = sheets.len(), "loaded sheet list");
                Change::SheetsLoaded(sheets)
            }
            Request::LoadSheet { name } => {
                debug!(sheet = %name, "loading sheet");
                let rows = self
                    .api
                    .list_rows(&name)
                    .await
                    .with_context(|| format!("failed to load rows of sheet '{name}'"))?;
                let fields = self
                    .api
                    .list_columns(&name)
                    .await
                    .with_context(|| format!("failed to load columns of sheet '{name}'"))?;
                info!(sheet = %name, rows = rows.len(), fields = fields.len(), "loaded sheet");
                Change::SheetLoaded { name, rows, fields }
            }
            Request::UpdateRow {
                sheet,
                row_index,
                updates,
                conditions,
            } => {
                let row = self
                    .api
                    .update_row(&sheet, &updates, &conditions)
                    .await
                    .with_context(|| format!("failed to update row {row_index} of '{sheet}'"))?;
                Change::RowReplaced { row_index, row }
            }
            Request::DeleteRow {
                sheet,
                row_index,
                conditions,
            } => {
                self.api
                    .delete_row(&sheet, &conditions)
                    .await
                    .with_context(|| format!("failed to delete row {row_index} of '{sheet}'"))?;
                Change::RowRemoved { row_index }
            }
            Request::RenameColumn {
                sheet,
                column_index,
                old_name,
                new_name,
            } => {
                let updates = serde_json::to_value(RenameColumnRequest {
                    name: new_name.clone(),
                })?;
                self.api
                    .update_column(&sheet, &old_name, &updates)
                    .await
                    .with_context(|| {
                        format!("failed to rename column '{old_name}' of '{sheet}'")
                    })?;
                Change::FieldRenamed {
                    column_index,
                    old_name,
                    new_name,
                }
            }
            Request::CreateRow { sheet, data } => {
                let row = self
                    .api
                    .create_row(&sheet, &data)
                    .await
                    .with_context(|| format!("failed to insert row into '{sheet}'"))?;
                Change::RowAppended(row)
            }
            Request::CreateColumn { sheet, name } => {
                let field = self
                    .api
                    .create_column(&sheet, &name)
                    .await
                    .with_context(|| format!("failed to add column '{name}' to '{sheet}'"))?;
                Change::FieldAppended(field)
            }
        };
        Ok(change)
    }

    fn apply(&mut self, change: Change) {
        let state = mem::take(&mut self.state);
        self.state = reducer::reduce(state, change);
    }

    fn render(&self) {
        let signal = StoreSignal::Render(Arc::new(self.state.clone()));
        debug!(
            signal = signal.name(),
            revision = self.state.active_sheet.revision,
            "emitting"
        );
        // No subscribers is fine; nobody is drawing yet.
        let _ = self.signals.send(signal);
    }

    /// Processes commands in arrival order until every handle is dropped.
    pub async fn run(mut self, mut commands: mpsc::Receiver<StoreEvent>) -> Self {
        while let Some(event) = commands.recv().await {
            self.handle(event).await;
        }
        debug!("store command queue closed");
        self
    }
}

impl<A: SheetsApi + 'static> Store<A> {
    /// Moves the store onto its own task and returns the handle that feeds it.
    pub fn spawn(self, capacity: usize) -> (StoreHandle, JoinHandle<Self>) {
        let (tx, rx) = mpsc::channel(capacity);
        let handle = StoreHandle {
            commands: tx,
            signals: self.signals.clone(),
        };
        let task = tokio::spawn(self.run(rx));
        (handle, task)
    }
}

/// Status and decoded backend error behind a failed command, when the HTTP
/// layer produced it.
fn backend_failure(err: &anyhow::Error) -> (Option<u16>, Option<ApiError>) {
    match err.downcast_ref::<ClientError>() {
        Some(client_err) => (client_err.status(), client_err.api_error()),
        None => (None, None),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("store command queue is full; please retry")]
    Full,
    #[error("store task has stopped")]
    Closed,
}

#[derive(Clone)]
pub struct StoreHandle {
    commands: mpsc::Sender<StoreEvent>,
    signals: broadcast::Sender<StoreSignal>,
}

impl StoreHandle {
    /// Queues `event` without waiting.
    pub fn dispatch(&self, event: StoreEvent) -> Result<(), DispatchError> {
        let name = event.name();
        match self.commands.try_send(event) {
            Ok(()) => {
                debug!(event = name, "queued store event");
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(DispatchError::Full),
            Err(TrySendError::Closed(_)) => Err(DispatchError::Closed),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreSignal> {
        self.signals.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
