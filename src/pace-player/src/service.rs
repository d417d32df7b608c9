use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{MessageCategory, Outcome, PlaybackController, SessionEvent, Status};

/// Commands accepted by the player service.
#[derive(Debug)]
pub enum PlayerCommand {
    Enqueue {
        url: String,
        reply: oneshot::Sender<Outcome>,
    },
    Next(oneshot::Sender<Outcome>),
    Pause(oneshot::Sender<Outcome>),
    Resume(oneshot::Sender<Outcome>),
    Clear(oneshot::Sender<Outcome>),
    Status(oneshot::Sender<Status>),
    Shutdown,
}

/// Cloneable handle for sending commands to a running [`PlayerService`].
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    command_tx: mpsc::UnboundedSender<PlayerCommand>,
}

impl PlayerHandle {
    pub async fn enqueue(&self, url: impl Into<String>) -> Outcome {
        let url = url.into();
        self.request(|reply| PlayerCommand::Enqueue { url, reply })
            .await
    }

    pub async fn next(&self) -> Outcome {
        self.request(PlayerCommand::Next).await
    }

    pub async fn pause(&self) -> Outcome {
        self.request(PlayerCommand::Pause).await
    }

    pub async fn resume(&self) -> Outcome {
        self.request(PlayerCommand::Resume).await
    }

    pub async fn clear(&self) -> Outcome {
        self.request(PlayerCommand::Clear).await
    }

    /// `None` once the service has stopped.
    pub async fn status(&self) -> Option<Status> {
        let (reply, rx) = oneshot::channel();
        self.command_tx.send(PlayerCommand::Status(reply)).ok()?;
        rx.await.ok()
    }

    pub fn shutdown(&self) {
        let _ = self.command_tx.send(PlayerCommand::Shutdown);
    }

    async fn request(
        &self,
        command: impl FnOnce(oneshot::Sender<Outcome>) -> PlayerCommand,
    ) -> Outcome {
        let (reply, rx) = oneshot::channel();
        if self.command_tx.send(command(reply)).is_err() {
            return Outcome::failure(MessageCategory::ServiceStopped);
        }
        rx.await
            .unwrap_or_else(|_| Outcome::failure(MessageCategory::ServiceStopped))
    }
}

/// Single dispatch point: owns the controller and feeds it commands and
/// session events one at a time.
pub struct PlayerService {
    controller: PlaybackController,
    command_rx: mpsc::UnboundedReceiver<PlayerCommand>,
    session_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl PlayerService {
    pub fn spawn(
        controller: PlaybackController,
        session_rx: mpsc::UnboundedReceiver<SessionEvent>,
    ) -> (PlayerHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let service = Self {
            controller,
            command_rx,
            session_rx,
        };
        let join = tokio::spawn(service.run());
        (PlayerHandle { command_tx }, join)
    }

    async fn run(mut self) {
        tracing::debug!("player service started");
        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    if !self.dispatch(command).await {
                        break;
                    }
                }
                Some(event) = self.session_rx.recv() => {
                    self.controller.handle_event(event).await;
                }
            }
        }
        self.controller.shutdown();
        tracing::debug!("player service stopped");
    }

    /// Returns `false` when the service should stop.
    async fn dispatch(&mut self, command: PlayerCommand) -> bool {
        match command {
            PlayerCommand::Enqueue { url, reply } => {
                let _ = reply.send(self.controller.enqueue(&url).await);
            }
            PlayerCommand::Next(reply) => {
                let _ = reply.send(self.controller.next().await);
            }
            PlayerCommand::Pause(reply) => {
                let _ = reply.send(self.controller.pause());
            }
            PlayerCommand::Resume(reply) => {
                let _ = reply.send(self.controller.resume());
            }
            PlayerCommand::Clear(reply) => {
                let _ = reply.send(self.controller.clear());
            }
            PlayerCommand::Status(reply) => {
                let _ = reply.send(self.controller.status());
            }
            PlayerCommand::Shutdown => return false,
        }
        true
    }
}
