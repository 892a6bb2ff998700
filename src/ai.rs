//! The remote generation collaborator. A [`StoryAi`] owns at most one
//! session at a time; rewind and load recreate the session from a truncated
//! or restored transcript instead of mutating it in place. The simulated
//! backend fabricates deterministic content so the whole client works with
//! no API key.

use crate::error::{AiError, Result};
use crate::prompt::{self, HistoryTurn};
use crate::scenario::{InnerThoughts, PlotChoice, Scenario, SetupDetails, SetupField};
use crate::settings::data_dir;
use crate::sim;
use crate::transcript::Transcript;
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateImageRequestArgs, ImageModel, ImageResponseFormat,
        ImageSize, ResponseFormat,
    },
};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep, timeout};

/// Incremental outcome of one streamed assistant turn.
#[derive(Debug)]
pub enum StreamEvent {
    Fragment(String),
    Completed,
    /// Raw error text; classification happens at the edge that shows it.
    Failed(String),
}

#[derive(Clone)]
pub enum Backend {
    Remote {
        client: Client<OpenAIConfig>,
        model: String,
    },
    Simulated,
}

/// Replayable state of the active chat session. The remote side holds no
/// durable state of its own; every request carries the full seed.
pub struct StorySession {
    pub system_prompt: String,
    pub temperature: f32,
    pub turns: Vec<HistoryTurn>,
}

pub struct StoryAi {
    backend: Backend,
    session: Option<StorySession>,
}

impl StoryAi {
    pub fn remote(api_key: &str, model: &str) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            backend: Backend::Remote {
                client: Client::with_config(config),
                model: model.to_string(),
            },
            session: None,
        }
    }

    pub fn simulated() -> Self {
        Self {
            backend: Backend::Simulated,
            session: None,
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self.backend, Backend::Simulated)
    }

    pub fn backend(&self) -> Backend {
        self.backend.clone()
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Creates a fresh session seeded with the scenario and a replay of the
    /// given transcript. Any previous session is dropped.
    pub fn start_session(&mut self, scenario: &Scenario, transcript: &Transcript, language: &str) {
        self.session = Some(StorySession {
            system_prompt: prompt::system_prompt(scenario, language),
            temperature: scenario.model_quality.story_temperature(),
            turns: prompt::replay_history(transcript),
        });
    }

    pub fn end_session(&mut self) {
        self.session = None;
    }

    /// Prepares one streamed turn. The returned job owns everything it needs
    /// so it can run on its own task while the UI keeps repainting.
    pub fn turn_job(&self, scenario: &Scenario, augmented_message: String) -> Result<TurnJob> {
        let session = self.session.as_ref().ok_or(AiError::SessionNotInitialized)?;
        let job = match &self.backend {
            Backend::Simulated => TurnJob::Simulated {
                text: sim::sample_turn(&augmented_message, scenario),
            },
            Backend::Remote { client, model } => TurnJob::Remote {
                client: client.clone(),
                model: model.clone(),
                temperature: session.temperature,
                messages: request_messages(
                    &session.system_prompt,
                    &session.turns,
                    &augmented_message,
                )?,
            },
        };
        Ok(job)
    }

    /// Records a finished exchange so later turns (and the next reseed)
    /// replay it.
    pub fn complete_turn(&mut self, user_message: String, assistant_text: String) {
        if let Some(session) = self.session.as_mut() {
            session.turns.push(HistoryTurn::User(user_message));
            session.turns.push(HistoryTurn::Model(assistant_text));
        }
    }
}

/// One in-flight assistant turn, detached from the [`StoryAi`] that made it.
pub enum TurnJob {
    Remote {
        client: Client<OpenAIConfig>,
        model: String,
        temperature: f32,
        messages: Vec<ChatCompletionRequestMessage>,
    },
    Simulated {
        text: String,
    },
}

impl TurnJob {
    /// Drives the turn to completion, forwarding fragments as they arrive.
    /// Send failures mean the receiver is gone, so they end the job quietly.
    pub async fn run(self, events: mpsc::UnboundedSender<StreamEvent>) {
        match self {
            TurnJob::Simulated { text } => {
                for fragment in sim::fragment(&text) {
                    sleep(Duration::from_millis(25)).await;
                    if events.send(StreamEvent::Fragment(fragment)).is_err() {
                        return;
                    }
                }
                let _ = events.send(StreamEvent::Completed);
            }
            TurnJob::Remote {
                client,
                model,
                temperature,
                messages,
            } => {
                let request = match CreateChatCompletionRequestArgs::default()
                    .model(&model)
                    .messages(messages)
                    .temperature(temperature)
                    .stream(true)
                    .build()
                {
                    Ok(request) => request,
                    Err(e) => {
                        let _ = events.send(StreamEvent::Failed(e.to_string()));
                        return;
                    }
                };

                let mut stream = match client.chat().create_stream(request).await {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = events.send(StreamEvent::Failed(e.to_string()));
                        return;
                    }
                };

                while let Some(result) = stream.next().await {
                    match result {
                        Ok(response) => {
                            for choice in &response.choices {
                                if let Some(content) = &choice.delta.content {
                                    if !content.is_empty()
                                        && events
                                            .send(StreamEvent::Fragment(content.clone()))
                                            .is_err()
                                    {
                                        return;
                                    }
                                }
                            }
                        }
                        Err(e) => {
                            let _ = events.send(StreamEvent::Failed(e.to_string()));
                            return;
                        }
                    }
                }
                let _ = events.send(StreamEvent::Completed);
            }
        }
    }
}

fn request_messages(
    system_prompt: &str,
    turns: &[HistoryTurn],
    user_message: &str,
) -> Result<Vec<ChatCompletionRequestMessage>> {
    let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(turns.len() + 2);
    messages.push(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(AiError::from)?
            .into(),
    );
    for turn in turns {
        match turn {
            HistoryTurn::User(text) => messages.push(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(text.as_str())
                    .build()
                    .map_err(AiError::from)?
                    .into(),
            ),
            HistoryTurn::Model(text) => messages.push(
                ChatCompletionRequestAssistantMessageArgs::default()
                    .content(text.as_str())
                    .build()
                    .map_err(AiError::from)?
                    .into(),
            ),
        }
    }
    messages.push(
        ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(AiError::from)?
            .into(),
    );
    Ok(messages)
}

impl Backend {
    /// One-shot completion constrained to a JSON object response.
    async fn generate_json(
        &self,
        prompt: String,
        temperature: f32,
    ) -> std::result::Result<serde_json::Value, AiError> {
        let Backend::Remote { client, model } = self else {
            // Simulated callers are handled before reaching here.
            return Err(AiError::SessionNotInitialized);
        };
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(vec![
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .temperature(temperature)
            .response_format(ResponseFormat::JsonObject)
            .build()?;

        let response = client.chat().create(request).await?;
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or(AiError::NoMessageFound)?;
        Ok(serde_json::from_str(content.trim())?)
    }

    /// Plain one-shot completion, for the image prompt step.
    async fn generate_text(
        &self,
        prompt: String,
        temperature: f32,
    ) -> std::result::Result<String, AiError> {
        let Backend::Remote { client, model } = self else {
            return Err(AiError::SessionNotInitialized);
        };
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(vec![
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .temperature(temperature)
            .build()?;
        let response = client.chat().create(request).await?;
        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|text| text.trim().to_string())
            .ok_or(AiError::NoMessageFound)
    }

    /// The companion's inner monologue at the latest point of the story.
    pub async fn inner_thoughts(
        &self,
        prompt: String,
    ) -> std::result::Result<InnerThoughts, AiError> {
        if let Backend::Simulated = self {
            sleep(Duration::from_millis(500)).await;
            return Ok(sim::sample_inner_thoughts());
        }
        let value = self.generate_json(prompt, 0.7).await?;
        let thoughts: InnerThoughts = serde_json::from_value(value)
            .map_err(|e| AiError::MalformedResponse(format!("inner thoughts: {e}")))?;
        Ok(thoughts)
    }

    /// Exactly two suggested plot directions.
    pub async fn plot_choices(
        &self,
        prompt: String,
        temperature: f32,
    ) -> std::result::Result<Vec<PlotChoice>, AiError> {
        if let Backend::Simulated = self {
            sleep(Duration::from_millis(800)).await;
            return Ok(sim::sample_plot_choices());
        }
        let value = self.generate_json(prompt, temperature).await?;
        let choices = value
            .get("choices")
            .and_then(|c| c.as_array())
            .ok_or_else(|| AiError::MalformedResponse("missing choices array".into()))?;
        if choices.len() < 2 {
            return Err(AiError::MalformedResponse(format!(
                "expected two plot choices, got {}",
                choices.len()
            )));
        }
        choices
            .iter()
            .take(2)
            .map(|choice| {
                serde_json::from_value(choice.clone())
                    .map_err(|e| AiError::MalformedResponse(format!("plot choice: {e}")))
            })
            .collect()
    }

    /// Generated field set for one setup section.
    pub async fn setup_details(
        &self,
        field: SetupField,
    ) -> std::result::Result<SetupDetails, AiError> {
        if let Backend::Simulated = self {
            sleep(Duration::from_millis(500)).await;
            return Ok(sim::sample_setup_details(field));
        }
        let prompt = match field {
            SetupField::Player => {
                "For a fantasy or science-fiction text adventure, invent a \
                 distinctive protagonist. Reply as a JSON object with string \
                 keys \"name\", \"gender\" and \"description\" (background, \
                 appearance, personality)."
            }
            SetupField::Partner => {
                "For a fantasy or science-fiction text adventure, invent an \
                 interesting companion or narrator who will guide the player. \
                 Reply as a JSON object with string keys \"name\", \"gender\" \
                 and \"description\"."
            }
            SetupField::World => {
                "Design a compelling world for a text adventure. Reply as a \
                 JSON object with string keys \"world_view\" (the grand \
                 premise: rules, history, atmosphere) and \"opening_plot\" (a \
                 concrete, suspenseful opening scene)."
            }
        };
        let value = self.generate_json(prompt.to_string(), 0.9).await?;
        serde_json::from_value(value)
            .map_err(|e| AiError::MalformedResponse(format!("setup details: {e}")))
    }

    /// Derives an image prompt from the scenario, renders it, and saves the
    /// result under the app data directory. Returns a reference usable as
    /// the scenario's background image.
    pub async fn scene_image(&self, prompt: String) -> std::result::Result<String, AiError> {
        if let Backend::Simulated = self {
            sleep(Duration::from_millis(1000)).await;
            return Ok("simulated://scene-image".to_string());
        }
        let Backend::Remote { client, .. } = self else {
            return Err(AiError::SessionNotInitialized);
        };

        let image_prompt = self.generate_text(prompt, 0.7).await?;
        if image_prompt.is_empty() {
            return Err(AiError::MalformedResponse(
                "empty image prompt from context".into(),
            ));
        }

        let request = CreateImageRequestArgs::default()
            .prompt(&image_prompt)
            .model(ImageModel::DallE3)
            .n(1)
            .response_format(ImageResponseFormat::Url)
            .size(ImageSize::S1024x1792)
            .build()?;

        let response = timeout(Duration::from_secs(120), client.images().create(request))
            .await
            .map_err(|_| AiError::NoImageReturned)??;
        let paths = response
            .save(data_dir().join("images"))
            .await
            .map_err(|e| AiError::MalformedResponse(e.to_string()))?;
        paths
            .first()
            .and_then(|path| path.to_str())
            .map(str::to_owned)
            .ok_or(AiError::NoImageReturned)
    }
}
