// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Private-conversation flow: classify, rate-limit, resolve, submit.

use std::sync::Arc;

use feedbackbot_core::types::{Bot, ChatMessage, Group, InlineOption, Language, PendingSelection};
use feedbackbot_core::{FeedbackBotError, FeedbackStore, Messenger, PendingStore, RateLimiter};
use tracing::{debug, warn};

use crate::callback::selection_data;
use crate::command::{CommandParser, Intent};
use crate::i18n::{MessageKey, localize};
use crate::reply::send_localized;
use crate::resolver::{GroupResolution, GroupResolver};
use crate::submission::{FeedbackPipeline, Submission, SubmissionRequest};

/// How a private message was handled. Every variant except `Ignored`
/// sent exactly one reply to the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivateMessageOutcome {
    /// No identifiable sender.
    Ignored,
    /// Answered with a fixed reply (greeting or a rejected message).
    Replied(MessageKey),
    RateLimited,
    NoActiveGroups,
    /// Options were offered for these group ids.
    AwaitingSelection(Vec<i64>),
    Submitted(Submission),
}

pub struct ConversationHandler {
    parser: CommandParser,
    limiter: Arc<dyn RateLimiter>,
    resolver: GroupResolver,
    pending: Arc<dyn PendingStore>,
    pipeline: Arc<FeedbackPipeline>,
}

impl ConversationHandler {
    pub fn new(
        parser: CommandParser,
        store: Arc<dyn FeedbackStore>,
        limiter: Arc<dyn RateLimiter>,
        pending: Arc<dyn PendingStore>,
        pipeline: Arc<FeedbackPipeline>,
    ) -> Self {
        Self {
            parser,
            limiter,
            resolver: GroupResolver::new(store),
            pending,
            pipeline,
        }
    }

    pub async fn handle<M>(
        &self,
        bot: &Bot,
        messenger: &M,
        message: &ChatMessage,
    ) -> Result<PrivateMessageOutcome, FeedbackBotError>
    where
        M: Messenger + ?Sized,
    {
        let Some(sender_id) = message.sender_id else {
            debug!(bot_id = bot.id, chat_id = message.chat_id, "private message without sender");
            return Ok(PrivateMessageOutcome::Ignored);
        };
        let lang = Language::detect(message.language_code.as_deref());

        let key = match self.parser.parse(message.text.as_deref().unwrap_or_default()) {
            Intent::Feedback { text, admin_only } => {
                let request = SubmissionRequest {
                    reply_chat_id: message.chat_id,
                    telegram_user_id: sender_id,
                    text: &text,
                    admin_only,
                    language: lang,
                };
                return self.accept(bot, messenger, request).await;
            }
            Intent::Greeting => MessageKey::Welcome,
            Intent::EmptyAdminOnly => MessageKey::AdminOnlyEmpty,
            Intent::UnknownCommand => MessageKey::UnknownCommand,
            Intent::EmptyMessage => MessageKey::EmptyMessage,
            Intent::TooLong => MessageKey::TooLong,
        };
        send_localized(messenger, message.chat_id, key, lang).await;
        Ok(PrivateMessageOutcome::Replied(key))
    }

    /// Rate-limits a feedback intent, then submits it or asks for a group.
    async fn accept<M>(
        &self,
        bot: &Bot,
        messenger: &M,
        request: SubmissionRequest<'_>,
    ) -> Result<PrivateMessageOutcome, FeedbackBotError>
    where
        M: Messenger + ?Sized,
    {
        let chat_id = request.reply_chat_id;
        let lang = request.language;

        if !self.limiter.check_and_record(request.telegram_user_id) {
            debug!(bot_id = bot.id, "submission over rate limit");
            send_localized(messenger, chat_id, MessageKey::RateLimited, lang).await;
            return Ok(PrivateMessageOutcome::RateLimited);
        }

        match self.resolver.resolve(bot.id).await? {
            GroupResolution::NoActiveGroups => {
                send_localized(messenger, chat_id, MessageKey::NoGroups, lang).await;
                Ok(PrivateMessageOutcome::NoActiveGroups)
            }
            GroupResolution::Single(group) => {
                let submission = self.pipeline.submit(messenger, &group, request).await?;
                Ok(PrivateMessageOutcome::Submitted(submission))
            }
            GroupResolution::Multiple(groups) => {
                self.pending
                    .put(PendingSelection {
                        telegram_user_id: request.telegram_user_id,
                        bot_id: bot.id,
                        text: request.text.to_string(),
                        admin_only: request.admin_only,
                        language: lang,
                    })
                    .await?;

                let options: Vec<InlineOption> = groups.iter().map(group_option).collect();
                if let Err(e) = messenger
                    .send_with_options(chat_id, localize(MessageKey::PickGroup, lang), &options)
                    .await
                {
                    warn!(error = %e, bot_id = bot.id, chat_id, "failed to send group choice (non-fatal)");
                }
                Ok(PrivateMessageOutcome::AwaitingSelection(
                    groups.iter().map(|g| g.id).collect(),
                ))
            }
        }
    }
}

fn group_option(group: &Group) -> InlineOption {
    // Buttons need a non-empty label.
    let label = if group.title.trim().is_empty() {
        format!("#{}", group.id)
    } else {
        group.title.clone()
    };
    InlineOption {
        label,
        data: selection_data(group.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pending::InMemoryPendingStore;
    use crate::ratelimit::SlidingWindowLimiter;
    use crate::testing::{self, RecordingMessenger, Sent};
    use feedbackbot_config::model::FeedbackConfig as FeedbackSettings;
    use feedbackbot_core::types::ChatType;
    use feedbackbot_storage::SqliteStore;
    use feedbackbot_storage::queries::feedback;
    use std::time::Duration;

    const USER: i64 = 900;

    struct Fixture {
        store: Arc<SqliteStore>,
        pending: Arc<InMemoryPendingStore>,
        handler: ConversationHandler,
        bot: Bot,
        _dir: tempfile::TempDir,
    }

    async fn fixture(max_per_window: u32) -> Fixture {
        let (store, dir) = testing::store().await;
        let bot = testing::seed_bot(&store, "acme").await;
        let pending = Arc::new(InMemoryPendingStore::new());
        let handler = ConversationHandler::new(
            CommandParser::new(&FeedbackSettings::default()),
            store.clone(),
            Arc::new(SlidingWindowLimiter::new(
                max_per_window,
                Duration::from_secs(3600),
            )),
            pending.clone(),
            Arc::new(FeedbackPipeline::new(store.clone())),
        );
        Fixture {
            store,
            pending,
            handler,
            bot,
            _dir: dir,
        }
    }

    fn message(text: &str) -> ChatMessage {
        ChatMessage {
            chat_id: USER,
            chat_type: ChatType::Private,
            sender_id: Some(USER),
            language_code: Some("en".into()),
            text: Some(text.to_string()),
        }
    }

    async fn feedback_count(store: &SqliteStore) -> i64 {
        feedback::count_feedback(store.database().unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn single_group_submits_directly() {
        let fx = fixture(10).await;
        let group = testing::seed_group(&fx.store, &fx.bot, -100, "G1").await;
        let messenger = RecordingMessenger::new();

        let outcome = fx
            .handler
            .handle(&fx.bot, &messenger, &message("hello there"))
            .await
            .unwrap();

        let PrivateMessageOutcome::Submitted(submission) = outcome else {
            panic!("expected Submitted, got {outcome:?}");
        };
        assert_eq!(submission.record.group_id, group.id);
        assert_eq!(submission.record.message, "hello there");
        assert!(!submission.record.admin_only);
    }

    #[tokio::test]
    async fn multiple_groups_offer_a_choice() {
        let fx = fixture(10).await;
        let g1 = testing::seed_group(&fx.store, &fx.bot, -100, "G1").await;
        let g2 = testing::seed_group(&fx.store, &fx.bot, -200, "G2").await;
        let messenger = RecordingMessenger::new();

        let outcome = fx
            .handler
            .handle(&fx.bot, &messenger, &message("fix the coffee machine"))
            .await
            .unwrap();

        assert_eq!(outcome, PrivateMessageOutcome::AwaitingSelection(vec![g1.id, g2.id]));
        assert_eq!(feedback_count(&fx.store).await, 0);

        let stored = fx.pending.get(USER).await.unwrap().unwrap();
        assert_eq!(stored.text, "fix the coffee machine");
        assert_eq!(stored.bot_id, fx.bot.id);

        let Sent::Options { options, text, .. } = &messenger.sent()[0] else {
            panic!("expected options");
        };
        assert_eq!(text, localize(MessageKey::PickGroup, Language::En));
        assert_eq!(
            options,
            &vec![
                InlineOption {
                    label: "G1".into(),
                    data: format!("fb:{}", g1.id),
                },
                InlineOption {
                    label: "G2".into(),
                    data: format!("fb:{}", g2.id),
                },
            ]
        );
    }

    #[tokio::test]
    async fn newer_message_replaces_pending_selection() {
        let fx = fixture(10).await;
        testing::seed_group(&fx.store, &fx.bot, -100, "G1").await;
        testing::seed_group(&fx.store, &fx.bot, -200, "G2").await;
        let messenger = RecordingMessenger::new();

        for text in ["first", "/adminOnly second"] {
            fx.handler
                .handle(&fx.bot, &messenger, &message(text))
                .await
                .unwrap();
        }

        let stored = fx.pending.get(USER).await.unwrap().unwrap();
        assert_eq!(stored.text, "second");
        assert!(stored.admin_only);
        assert_eq!(fx.pending.len().await, 1);
    }

    #[tokio::test]
    async fn no_groups_is_reported() {
        let fx = fixture(10).await;
        let messenger = RecordingMessenger::new();

        let outcome = fx
            .handler
            .handle(&fx.bot, &messenger, &message("anyone?"))
            .await
            .unwrap();

        assert_eq!(outcome, PrivateMessageOutcome::NoActiveGroups);
        assert_eq!(
            messenger.texts_to(USER),
            vec![localize(MessageKey::NoGroups, Language::En).to_string()]
        );
    }

    #[tokio::test]
    async fn empty_admin_only_prompts_without_recording() {
        let fx = fixture(10).await;
        testing::seed_group(&fx.store, &fx.bot, -100, "G1").await;
        let messenger = RecordingMessenger::new();

        let outcome = fx
            .handler
            .handle(&fx.bot, &messenger, &message("/adminOnly "))
            .await
            .unwrap();

        assert_eq!(outcome, PrivateMessageOutcome::Replied(MessageKey::AdminOnlyEmpty));
        assert_eq!(feedback_count(&fx.store).await, 0);
    }

    #[tokio::test]
    async fn rejections_reply_in_sender_language() {
        let fx = fixture(10).await;
        let messenger = RecordingMessenger::new();
        let mut msg = message("/unknown");
        msg.language_code = Some("ru-RU".into());

        let outcome = fx.handler.handle(&fx.bot, &messenger, &msg).await.unwrap();

        assert_eq!(outcome, PrivateMessageOutcome::Replied(MessageKey::UnknownCommand));
        assert_eq!(
            messenger.texts_to(USER),
            vec![localize(MessageKey::UnknownCommand, Language::Ru).to_string()]
        );
    }

    #[tokio::test]
    async fn non_text_message_is_empty() {
        let fx = fixture(10).await;
        let messenger = RecordingMessenger::new();
        let mut msg = message("");
        msg.text = None;

        let outcome = fx.handler.handle(&fx.bot, &messenger, &msg).await.unwrap();
        assert_eq!(outcome, PrivateMessageOutcome::Replied(MessageKey::EmptyMessage));
    }

    #[tokio::test]
    async fn rate_limit_blocks_the_eleventh_submission() {
        let fx = fixture(10).await;
        testing::seed_group(&fx.store, &fx.bot, -100, "G1").await;
        let messenger = RecordingMessenger::new();

        for i in 0..10 {
            let outcome = fx
                .handler
                .handle(&fx.bot, &messenger, &message(&format!("feedback {i}")))
                .await
                .unwrap();
            assert!(matches!(outcome, PrivateMessageOutcome::Submitted(_)));
        }
        let outcome = fx
            .handler
            .handle(&fx.bot, &messenger, &message("one too many"))
            .await
            .unwrap();

        assert_eq!(outcome, PrivateMessageOutcome::RateLimited);
        assert_eq!(feedback_count(&fx.store).await, 10);
    }

    #[tokio::test]
    async fn commands_do_not_consume_budget() {
        let fx = fixture(1).await;
        testing::seed_group(&fx.store, &fx.bot, -100, "G1").await;
        let messenger = RecordingMessenger::new();

        for text in ["/start", "/help", "/nope", "  "] {
            fx.handler
                .handle(&fx.bot, &messenger, &message(text))
                .await
                .unwrap();
        }
        let outcome = fx
            .handler
            .handle(&fx.bot, &messenger, &message("real feedback"))
            .await
            .unwrap();
        assert!(matches!(outcome, PrivateMessageOutcome::Submitted(_)));
    }

    #[tokio::test]
    async fn message_without_sender_is_ignored() {
        let fx = fixture(10).await;
        let messenger = RecordingMessenger::new();
        let mut msg = message("hello");
        msg.sender_id = None;

        let outcome = fx.handler.handle(&fx.bot, &messenger, &msg).await.unwrap();
        assert_eq!(outcome, PrivateMessageOutcome::Ignored);
        assert!(messenger.sent().is_empty());
    }

    #[test]
    fn untitled_group_gets_a_fallback_label() {
        let group = Group {
            id: 7,
            tenant_id: 1,
            bot_id: 1,
            chat_id: -1,
            title: " ".into(),
            chat_type: ChatType::Group,
            is_active: true,
        };
        assert_eq!(group_option(&group).label, "#7");
        assert_eq!(group_option(&group).data, "fb:7");
    }
}
