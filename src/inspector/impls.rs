// Standard library
use std::str::FromStr;
use std::time::Duration;

// 3rd party crates
use serde_json::{json, Map, Value};
use tracing::debug;

// Project imports
use crate::utility::rate_limiter::{AcquireOptions, RateLimiter, TokenBucketRateLimiter};

// Current module imports
use super::constants::{HELP, WILDCARD};
use super::errors::InspectorError;
use super::types::{Command, Inspector};

fn required<'a>(
    args: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<String, InspectorError> {
    args.next()
        .map(str::to_string)
        .ok_or(InspectorError::MissingArgument { command, argument })
}

fn scope<'a>(args: &mut impl Iterator<Item = &'a str>) -> Option<String> {
    args.next()
        .filter(|arg| *arg != WILDCARD)
        .map(str::to_string)
}

impl FromStr for Command {
    type Err = InspectorError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut args = line.split_whitespace();
        let name = args.next().ok_or(InspectorError::Empty)?;

        let (command, name): (Command, &'static str) = match name.to_lowercase().as_str() {
            "status" => (
                Command::Status {
                    provider: required(&mut args, "status", "provider")?,
                    user_id: required(&mut args, "status", "user")?,
                },
                "status",
            ),
            "all" => (
                Command::All {
                    user_id: required(&mut args, "all", "user")?,
                },
                "all",
            ),
            "next" => (
                Command::Next {
                    provider: required(&mut args, "next", "provider")?,
                    user_id: required(&mut args, "next", "user")?,
                },
                "next",
            ),
            "acquire" => {
                let provider = required(&mut args, "acquire", "provider")?;
                let user_id = required(&mut args, "acquire", "user")?;
                let timeout = match args.next() {
                    Some(raw) => Some(Duration::from_millis(
                        raw.parse::<u64>()
                            .map_err(|_| InspectorError::InvalidTimeout(raw.to_string()))?,
                    )),
                    None => None,
                };
                (
                    Command::Acquire {
                        provider,
                        user_id,
                        timeout,
                    },
                    "acquire",
                )
            }
            "try" => (
                Command::Try {
                    provider: required(&mut args, "try", "provider")?,
                    user_id: required(&mut args, "try", "user")?,
                },
                "try",
            ),
            "reset" => (
                Command::Reset {
                    provider: scope(&mut args),
                    user_id: scope(&mut args),
                },
                "reset",
            ),
            "providers" => (Command::Providers, "providers"),
            "metrics" => (Command::Metrics, "metrics"),
            "help" | "?" => (Command::Help, "help"),
            "quit" | "exit" => (Command::Quit, "quit"),
            _ => return Err(InspectorError::UnknownCommand(name.to_string())),
        };

        if args.next().is_some() {
            return Err(InspectorError::TooManyArguments(name));
        }

        Ok(command)
    }
}

impl Inspector {
    pub fn new(limiter: TokenBucketRateLimiter) -> Self {
        Self { limiter }
    }

    /// Runs one command and renders its result as JSON.
    pub async fn execute(&self, command: Command) -> Result<Value, InspectorError> {
        debug!("Executing console command {:?}", command);

        let value = match command {
            Command::Status { provider, user_id } => {
                json!(self.limiter.get_status(&provider, &user_id)?)
            }
            Command::All { user_id } => json!(self.limiter.get_all_status(&user_id)),
            Command::Next { provider, user_id } => {
                let wait = self.limiter.get_time_until_next_token(&provider, &user_id)?;
                json!({ "provider": provider, "userId": user_id, "waitMs": wait.as_millis() as u64 })
            }
            Command::Acquire {
                provider,
                user_id,
                timeout,
            } => {
                let options = AcquireOptions { timeout };
                match self.limiter.acquire_with(&provider, &user_id, options).await {
                    Ok(()) => json!({ "granted": true, "provider": provider, "userId": user_id }),
                    Err(e) => json!({
                        "granted": false,
                        "httpStatus": e.http_status(),
                        "body": e.to_response_body(),
                    }),
                }
            }
            Command::Try { provider, user_id } => {
                let granted = self.limiter.try_acquire(&provider, &user_id)?;
                json!({ "granted": granted, "provider": provider, "userId": user_id })
            }
            Command::Reset { provider, user_id } => {
                let cleared = self
                    .limiter
                    .reset(provider.as_deref(), user_id.as_deref());
                json!({ "clearedBuckets": cleared })
            }
            Command::Providers => self.providers(),
            Command::Metrics => self.metrics(),
            Command::Help => Value::String(HELP.to_string()),
            Command::Quit => Value::Null,
        };

        Ok(value)
    }

    fn providers(&self) -> Value {
        let default_timeout = self.limiter.default_timeout();
        let profiles: Map<String, Value> = self
            .limiter
            .provider_table()
            .profiles
            .iter()
            .map(|(name, profile)| {
                (
                    name.clone(),
                    json!({
                        "capacity": profile.capacity,
                        "refillIntervalMs": profile.refill_interval_ms,
                        "timeoutMs": profile.timeout(default_timeout).as_millis() as u64,
                    }),
                )
            })
            .collect();
        Value::Object(profiles)
    }

    fn metrics(&self) -> Value {
        let snapshot = self.limiter.metrics().get_snapshot();
        json!({
            "immediateGrants": snapshot.immediate_grants,
            "queuedGrants": snapshot.queued_grants,
            "rejections": snapshot.rejections,
            "timeouts": snapshot.timeouts,
            "cancellations": snapshot.cancellations,
            "unknownProviders": snapshot.unknown_providers,
            "resets": snapshot.resets,
            "lastGrantSecsAgo": snapshot.last_grant.map(|at| at.elapsed().as_secs()),
            "lastTimeoutSecsAgo": snapshot.last_timeout.map(|at| at.elapsed().as_secs()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::{ProviderProfile, ProviderTable};

    fn inspector() -> Inspector {
        let mut table = ProviderTable::default();
        table.insert("gemini", ProviderProfile::new(2, 500));
        Inspector::new(TokenBucketRateLimiter::new(table, Duration::from_secs(30)).unwrap())
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            "status gemini u1".parse::<Command>().unwrap(),
            Command::Status {
                provider: "gemini".into(),
                user_id: "u1".into()
            }
        );
        assert_eq!(
            "ACQUIRE gemini u1 250".parse::<Command>().unwrap(),
            Command::Acquire {
                provider: "gemini".into(),
                user_id: "u1".into(),
                timeout: Some(Duration::from_millis(250)),
            }
        );
        assert_eq!(
            "reset * u1".parse::<Command>().unwrap(),
            Command::Reset {
                provider: None,
                user_id: Some("u1".into())
            }
        );
        assert_eq!(
            "reset".parse::<Command>().unwrap(),
            Command::Reset {
                provider: None,
                user_id: None
            }
        );
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!(matches!("".parse::<Command>(), Err(InspectorError::Empty)));
        assert!(matches!(
            "status gemini".parse::<Command>(),
            Err(InspectorError::MissingArgument {
                argument: "user",
                ..
            })
        ));
        assert!(matches!(
            "acquire gemini u1 soon".parse::<Command>(),
            Err(InspectorError::InvalidTimeout(_))
        ));
        assert!(matches!(
            "metrics now".parse::<Command>(),
            Err(InspectorError::TooManyArguments("metrics"))
        ));
        assert!(matches!(
            "drop gemini".parse::<Command>(),
            Err(InspectorError::UnknownCommand(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn executes_against_limiter() {
        let inspector = inspector();

        for _ in 0..2 {
            let granted = inspector
                .execute("try gemini u1".parse().unwrap())
                .await
                .unwrap();
            assert_eq!(granted["granted"], true);
        }

        let status = inspector
            .execute("status gemini u1".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(status["availableTokens"], 0);
        assert_eq!(status["status"], "exhausted");

        let next = inspector
            .execute("next gemini u1".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(next["waitMs"], 500);

        let refused = inspector
            .execute("acquire gemini u1 100".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(refused["granted"], false);
        assert_eq!(refused["httpStatus"], 429);
        assert_eq!(refused["body"]["errorCode"], "rate_limit_timeout");

        let cleared = inspector
            .execute("reset gemini".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(cleared["clearedBuckets"], 1);

        let metrics = inspector.execute(Command::Metrics).await.unwrap();
        assert_eq!(metrics["immediateGrants"], 2);
        assert_eq!(metrics["timeouts"], 1);
        assert_eq!(metrics["resets"], 1);
    }

    #[tokio::test]
    async fn unknown_provider_surfaces_as_error() {
        let inspector = inspector();
        let result = inspector
            .execute("status openai u1".parse().unwrap())
            .await;
        assert!(matches!(result, Err(InspectorError::Limiter(_))));

        let providers = inspector.execute(Command::Providers).await.unwrap();
        assert_eq!(providers["gemini"]["capacity"], 2);
        assert_eq!(providers["gemini"]["timeoutMs"], 30_000);
    }
}
