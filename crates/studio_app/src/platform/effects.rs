use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use studio_core::{Effect, MessageKind, Msg, ProgressInfo};
use studio_engine::{EngineEvent, EngineHandle, EngineRequest, Outcome};
use studio_logging::{studio_info, studio_warn};

use super::upload::to_image_input;

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            let message_id = effect.message_id();
            let request = to_request(effect);
            studio_info!("Dispatching request for message {}", message_id);
            self.engine.submit(message_id, request);
        }
    }

    pub fn cancel_all(&self) {
        self.engine.cancel_all();
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            let Some(event) = engine.recv_timeout(Duration::from_millis(50)) else {
                continue;
            };
            if msg_tx.send(to_msg(event)).is_err() {
                break;
            }
        });
    }
}

fn to_request(effect: Effect) -> EngineRequest {
    match effect {
        Effect::GenerateText { prompt, .. } => EngineRequest::Text { prompt },
        Effect::DescribeImage {
            prompt, attachment, ..
        } => EngineRequest::DescribeImage {
            prompt,
            image: to_image_input(attachment),
        },
        Effect::GenerateVideo {
            prompt, attachment, ..
        } => EngineRequest::Video {
            prompt,
            image: attachment.map(to_image_input),
        },
    }
}

fn to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Status { request_id, status } => Msg::JobProgress {
            message_id: request_id,
            progress: ProgressInfo::new(status.message, status.progress.unwrap_or(0)),
        },
        EngineEvent::Completed { request_id, result } => match result {
            Ok(Outcome::Text(text)) => Msg::JobSucceeded {
                message_id: request_id,
                kind: MessageKind::Text,
                content: text,
            },
            Ok(Outcome::Video(artifact)) => Msg::JobSucceeded {
                message_id: request_id,
                kind: MessageKind::Video,
                content: artifact.into_string(),
            },
            Err(err) => {
                studio_warn!("Request {} failed: {}", request_id, err);
                Msg::JobFailed {
                    message_id: request_id,
                    description: err.to_string(),
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::Attachment;
    use studio_engine::{ArtifactRef, ImageInput, JobError, Status};

    #[test]
    fn video_effect_carries_image() {
        let effect = Effect::GenerateVideo {
            message_id: 2,
            prompt: "dance".to_string(),
            attachment: Some(Attachment {
                name: "cat.png".to_string(),
                mime_type: "image/png".to_string(),
                bytes: vec![1],
                preview: "file:///cat.png".to_string(),
            }),
        };
        assert_eq!(
            to_request(effect),
            EngineRequest::Video {
                prompt: "dance".to_string(),
                image: Some(ImageInput {
                    bytes: vec![1],
                    mime_type: "image/png".to_string(),
                }),
            }
        );
    }

    #[test]
    fn events_map_to_messages_by_request_id() {
        let progress = to_msg(EngineEvent::Status {
            request_id: 4,
            status: Status::processing("working", 45),
        });
        assert_eq!(
            progress,
            Msg::JobProgress {
                message_id: 4,
                progress: ProgressInfo::new("working", 45),
            }
        );

        let done = to_msg(EngineEvent::Completed {
            request_id: 4,
            result: Ok(Outcome::Video(ArtifactRef::new("blob:studio/ab"))),
        });
        assert_eq!(
            done,
            Msg::JobSucceeded {
                message_id: 4,
                kind: MessageKind::Video,
                content: "blob:studio/ab".to_string(),
            }
        );

        let failed = to_msg(EngineEvent::Completed {
            request_id: 4,
            result: Err(JobError::generation_failed(JobError::MissingArtifact)),
        });
        assert!(matches!(failed, Msg::JobFailed { message_id: 4, .. }));
    }
}
