use super::fields::FieldReader;
use serde_json::{Map, Value, json};

/// Typed configuration for every canonical node type the execution service understands.
///
/// Each variant lists its fields explicitly and fills blanks with that type's defaults.
/// Adding a node type means adding a variant, and the compiler then points at every
/// `match` that needs to learn about it.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeConfig {
    OpenAi(OpenAiConfig),
    OpenAiAdvanced(OpenAiAdvancedConfig),
    Gemini(GeminiConfig),
    GeminiAdvanced(GeminiAdvancedConfig),
    Claude(ClaudeConfig),
    Email(EmailConfig),
    Hashnode(HashnodeConfig),
    Webhook(WebhookConfig),
    MongoDb(MongoDbConfig),
    TextFile(TextFileConfig),
    Pdf(PdfConfig),
    WhatsApp(WhatsAppConfig),
    /// Uses the user query as its video URL; no fields of its own.
    VideoSummary,
    /// A canonical type without a field list. Only slot values reach the executor.
    Passthrough,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiAdvancedConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u64,
    pub json_mode: bool,
    pub stream: bool,
    pub system_instruction: Option<String>,
    pub user_prompt: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiAdvancedConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u64,
    pub system_instruction: Option<String>,
    pub user_prompt: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClaudeConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailConfig {
    pub from_email: Option<String>,
    pub to_email: Option<String>,
    pub smtp_server: String,
    pub smtp_port: u64,
    pub username: Option<String>,
    pub password: Option<String>,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashnodeConfig {
    pub api_key: Option<String>,
    pub publication_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebhookConfig {
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MongoDbConfig {
    pub mongo_uri: Option<String>,
    pub collection: Option<String>,
    pub operation: String,
    pub query: Option<String>,
    pub vector_field: Option<String>,
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextFileConfig {
    pub filename: String,
    pub save_path: String,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfConfig {
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhatsAppConfig {
    pub twilio_sid: Option<String>,
    pub twilio_token: Option<String>,
    pub to_number: Option<String>,
}

impl NodeConfig {
    /// Reads the allow-listed fields for `canonical` out of a node's `data`.
    pub fn from_data(canonical: &str, data: &Map<String, Value>) -> Self {
        let f = FieldReader::new(data);
        match canonical {
            "openai" => NodeConfig::OpenAi(OpenAiConfig {
                api_key: f.text("apiKey"),
                model: f.text("model").unwrap_or_else(|| "gpt-4o-mini".into()),
                temperature: f.number("temperature").unwrap_or(0.7),
            }),
            "openai/advanced" => NodeConfig::OpenAiAdvanced(OpenAiAdvancedConfig {
                api_key: f.text("apiKey"),
                model: f.text("model").unwrap_or_else(|| "gpt-4-turbo-preview".into()),
                temperature: f.number("temperature").unwrap_or(0.7),
                max_tokens: f.integer("maxTokens").unwrap_or(1024),
                json_mode: f.flag("jsonMode").unwrap_or(false),
                stream: f.flag("stream").unwrap_or(false),
                system_instruction: f.first_text(&["systemInstruction", "systemMessage"]),
                user_prompt: f.first_text(&["userPrompt", "input"]),
                context: f.text("context"),
            }),
            "gemini" => NodeConfig::Gemini(GeminiConfig {
                api_key: f.text("apiKey"),
                model: f.text("model").unwrap_or_else(|| "gemini-2.0-flash-exp".into()),
                temperature: f.number("temperature").unwrap_or(0.7),
            }),
            "gemini/advanced" => NodeConfig::GeminiAdvanced(GeminiAdvancedConfig {
                api_key: f.text("apiKey"),
                model: f.text("model").unwrap_or_else(|| "gemini-2.5-flash".into()),
                temperature: f.number("temperature").unwrap_or(0.7),
                max_output_tokens: f.integer("maxOutputTokens").unwrap_or(2048),
                system_instruction: f.text("systemInstruction"),
                user_prompt: f.text("userPrompt"),
                context: f.text("context"),
            }),
            "claude" => NodeConfig::Claude(ClaudeConfig {
                api_key: f.text("apiKey"),
                model: f
                    .text("model")
                    .unwrap_or_else(|| "claude-3-sonnet-20240229".into()),
                max_tokens: f.integer("maxTokens").unwrap_or(1024),
            }),
            "email" => NodeConfig::Email(EmailConfig {
                from_email: f.text("fromEmail"),
                to_email: f.text("toEmail"),
                smtp_server: f.text("smtpServer").unwrap_or_else(|| "smtp.gmail.com".into()),
                smtp_port: f.integer("smtpPort").unwrap_or(587),
                username: f.text("username"),
                password: f.text("password"),
                subject: f.text("subject").unwrap_or_else(|| "Workflow Output".into()),
            }),
            "hashnode" => NodeConfig::Hashnode(HashnodeConfig {
                api_key: f.text("apiKey"),
                publication_id: f.text("publicationId"),
            }),
            "webhook" => NodeConfig::Webhook(WebhookConfig {
                webhook_url: f.text("webhookUrl"),
            }),
            "mongodb" => NodeConfig::MongoDb(MongoDbConfig {
                mongo_uri: f.text("mongoUri"),
                collection: f.text("collection"),
                operation: f.text("operation").unwrap_or_else(|| "find".into()),
                query: f.text("query"),
                vector_field: f.text("vectorField"),
                limit: f.integer("limit").unwrap_or(10),
            }),
            "text" => NodeConfig::TextFile(TextFileConfig {
                filename: f
                    .text("filename")
                    .unwrap_or_else(|| "workflow_output.txt".into()),
                save_path: f.text("savePath").unwrap_or_else(|| "/tmp".into()),
                format: f.text("format").unwrap_or_else(|| "txt".into()),
            }),
            "pdf" => NodeConfig::Pdf(PdfConfig {
                filename: f.text("filename").unwrap_or_else(|| "output.pdf".into()),
            }),
            "whatsapp" => NodeConfig::WhatsApp(WhatsAppConfig {
                twilio_sid: f.text("twilio_sid"),
                twilio_token: f.text("twilio_token"),
                to_number: f.text("to_number"),
            }),
            "video_summary" => NodeConfig::VideoSummary,
            _ => NodeConfig::Passthrough,
        }
    }

    /// `true` for model-calling nodes whose main input is a piece of text.
    pub fn takes_primary_text(&self) -> bool {
        matches!(
            self,
            NodeConfig::OpenAi(_)
                | NodeConfig::OpenAiAdvanced(_)
                | NodeConfig::Gemini(_)
                | NodeConfig::GeminiAdvanced(_)
                | NodeConfig::Claude(_)
        )
    }

    /// The structured, per-instance parameters sent under `nodeParams`.
    pub fn params(&self) -> Map<String, Value> {
        let mut p = Map::new();
        match self {
            NodeConfig::OpenAi(c) => {
                put(&mut p, "model", c.model.as_str());
                put(&mut p, "temperature", c.temperature);
            }
            NodeConfig::OpenAiAdvanced(c) => {
                put_opt(&mut p, "api_key", &c.api_key);
                put(&mut p, "model", c.model.as_str());
                put(&mut p, "temperature", c.temperature);
                put(&mut p, "max_tokens", c.max_tokens);
                put_opt(&mut p, "system_instruction", &c.system_instruction);
                put_opt(&mut p, "user_prompt", &c.user_prompt);
                put_opt(&mut p, "context", &c.context);
                put(&mut p, "json_mode", c.json_mode);
                put(&mut p, "stream", c.stream);
            }
            NodeConfig::Gemini(c) => {
                put(&mut p, "model", c.model.as_str());
                put(&mut p, "temperature", c.temperature);
            }
            NodeConfig::GeminiAdvanced(c) => {
                put(&mut p, "model", c.model.as_str());
                put(&mut p, "temperature", c.temperature);
                put(&mut p, "max_output_tokens", c.max_output_tokens);
                put_opt(&mut p, "system_instruction", &c.system_instruction);
                put_opt(&mut p, "user_prompt", &c.user_prompt);
                put_opt(&mut p, "context", &c.context);
            }
            NodeConfig::Claude(c) => {
                put(&mut p, "model", c.model.as_str());
                put(&mut p, "max_tokens", c.max_tokens);
            }
            NodeConfig::Email(c) => {
                put_opt(&mut p, "to_email", &c.to_email);
                put(&mut p, "subject", c.subject.as_str());
            }
            NodeConfig::Hashnode(c) => {
                put_opt(&mut p, "publication_id", &c.publication_id);
            }
            NodeConfig::MongoDb(c) => {
                put_opt(&mut p, "collection", &c.collection);
                put(&mut p, "operation", c.operation.as_str());
                put_opt(&mut p, "query", &c.query);
                put_opt(&mut p, "vector_field", &c.vector_field);
                put(&mut p, "limit", c.limit);
            }
            NodeConfig::TextFile(c) => {
                put(&mut p, "filename", c.filename.as_str());
                put(&mut p, "save_path", c.save_path.as_str());
                put(&mut p, "format", c.format.as_str());
            }
            NodeConfig::Pdf(c) => {
                put(&mut p, "filename", c.filename.as_str());
            }
            NodeConfig::WhatsApp(c) => {
                put_opt(&mut p, "to_number", &c.to_number);
            }
            NodeConfig::Webhook(_) | NodeConfig::VideoSummary | NodeConfig::Passthrough => {}
        }
        p
    }

    /// Writes this instance's entries into the legacy flat `apiKeys` map.
    ///
    /// Credentials land under global, unsuffixed keys (the last instance wins); tunables
    /// are prefixed with the type name and the instance `suffix` (`""` or `"_N"`).
    pub fn write_legacy_keys(&self, suffix: &str, keys: &mut Map<String, Value>) {
        match self {
            NodeConfig::OpenAi(c) => {
                put(keys, "openai", c.api_key.clone().unwrap_or_default());
                put(keys, &format!("openai{suffix}_model"), c.model.as_str());
                put(keys, &format!("openai{suffix}_temperature"), c.temperature);
            }
            NodeConfig::OpenAiAdvanced(c) => {
                put(keys, "openai", c.api_key.clone().unwrap_or_default());
                put(keys, &format!("openai{suffix}_model"), c.model.as_str());
                put(keys, &format!("openai{suffix}_temperature"), c.temperature);
                put(keys, &format!("openai{suffix}_max_tokens"), c.max_tokens);
                put(keys, &format!("openai{suffix}_json_mode"), c.json_mode);
                put(keys, &format!("openai{suffix}_stream"), c.stream);
                put_opt(
                    keys,
                    &format!("openai{suffix}_system_message"),
                    &c.system_instruction,
                );
            }
            NodeConfig::Gemini(c) => {
                if let Some(api_key) = &c.api_key {
                    put(keys, "gemini", api_key.as_str());
                    put(keys, &format!("gemini{suffix}_model"), c.model.as_str());
                    put(keys, &format!("gemini{suffix}_temperature"), c.temperature);
                }
            }
            NodeConfig::GeminiAdvanced(c) => {
                if let Some(api_key) = &c.api_key {
                    put(keys, "gemini", api_key.as_str());
                    put(keys, &format!("gemini{suffix}_model"), c.model.as_str());
                    put(keys, &format!("gemini{suffix}_temperature"), c.temperature);
                    put(
                        keys,
                        &format!("gemini{suffix}_max_output_tokens"),
                        c.max_output_tokens,
                    );
                    put_opt(
                        keys,
                        &format!("gemini{suffix}_system_instruction"),
                        &c.system_instruction,
                    );
                }
            }
            NodeConfig::Claude(c) => {
                if let Some(api_key) = &c.api_key {
                    put(keys, "anthropic", api_key.as_str());
                    put(keys, &format!("claude{suffix}_model"), c.model.as_str());
                    put(keys, &format!("claude{suffix}_max_tokens"), c.max_tokens);
                }
            }
            NodeConfig::Email(c) => {
                if c.from_email.is_some() || c.to_email.is_some() {
                    let config = json!({
                        "from_email": c.from_email.clone().unwrap_or_default(),
                        "to_email": c.to_email.clone().unwrap_or_default(),
                        "smtp_server": c.smtp_server,
                        "smtp_port": c.smtp_port,
                        "username": c.username.clone().unwrap_or_default(),
                        "password": c.password.clone().unwrap_or_default(),
                        "subject": c.subject,
                    });
                    keys.insert("email_config".to_string(), config);
                }
            }
            NodeConfig::Hashnode(c) => {
                if let Some(api_key) = &c.api_key {
                    put(keys, "hashnode_token", api_key.as_str());
                    put(
                        keys,
                        &format!("hashnode_publication_id{suffix}"),
                        c.publication_id.clone().unwrap_or_default(),
                    );
                }
            }
            NodeConfig::Webhook(c) => {
                put_opt(keys, "webhook_url", &c.webhook_url);
            }
            NodeConfig::MongoDb(c) => {
                if let Some(uri) = &c.mongo_uri {
                    put(keys, "mongodb_uri", uri.as_str());
                    put(
                        keys,
                        &format!("mongodb{suffix}_collection"),
                        c.collection.clone().unwrap_or_default(),
                    );
                    put(keys, &format!("mongodb{suffix}_operation"), c.operation.as_str());
                    put(
                        keys,
                        &format!("mongodb{suffix}_query"),
                        c.query.clone().unwrap_or_default(),
                    );
                    put(
                        keys,
                        &format!("mongodb{suffix}_vector_field"),
                        c.vector_field.clone().unwrap_or_default(),
                    );
                    put(keys, &format!("mongodb{suffix}_limit"), c.limit);
                }
            }
            NodeConfig::TextFile(c) => {
                put(keys, &format!("text{suffix}_filename"), c.filename.as_str());
                put(keys, &format!("text{suffix}_save_path"), c.save_path.as_str());
                put(keys, &format!("text{suffix}_format"), c.format.as_str());
            }
            NodeConfig::Pdf(c) => {
                put(keys, &format!("pdf{suffix}_filename"), c.filename.as_str());
            }
            NodeConfig::WhatsApp(c) => {
                if let (Some(sid), Some(token)) = (&c.twilio_sid, &c.twilio_token) {
                    put(keys, "twilio_sid", sid.as_str());
                    put(keys, "twilio_token", token.as_str());
                    put(
                        keys,
                        &format!("whatsapp{suffix}_to_number"),
                        c.to_number.clone().unwrap_or_default(),
                    );
                }
            }
            NodeConfig::VideoSummary | NodeConfig::Passthrough => {}
        }
    }
}

fn put(map: &mut Map<String, Value>, key: &str, value: impl Into<Value>) {
    map.insert(key.to_string(), value.into());
}

fn put_opt(map: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        map.insert(key.to_string(), Value::String(v.clone()));
    }
}
