// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routes each inbound event to its handler inside a per-event error
//! boundary.
//!
//! A handler error or panic is logged, counted and swallowed so the poller
//! keeps advancing past the event. Private senders get a best-effort
//! "unexpected error" reply.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use feedbackbot_config::model::FeedbackConfig as FeedbackSettings;
use feedbackbot_core::types::{Bot, ChatType, InboundEvent, InboundUpdate, Language};
use feedbackbot_core::{FeedbackBotError, FeedbackStore, Messenger, PendingStore, RateLimiter};
use futures::FutureExt;
use tracing::{debug, error};

use crate::callback::{CallbackHandler, CallbackOutcome};
use crate::command::CommandParser;
use crate::conversation::{ConversationHandler, PrivateMessageOutcome};
use crate::i18n::MessageKey;
use crate::membership::{MembershipOutcome, MembershipTracker};
use crate::metrics;
use crate::reply::send_localized;
use crate::submission::FeedbackPipeline;

/// What happened to one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Membership(MembershipOutcome),
    PrivateMessage(PrivateMessageOutcome),
    Callback(CallbackOutcome),
    /// Event kind or chat the pipeline does not handle.
    Skipped,
    /// The handler failed; the event is dropped.
    Failed,
}

pub struct Dispatcher {
    membership: MembershipTracker,
    conversation: ConversationHandler,
    callbacks: CallbackHandler,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn FeedbackStore>,
        pending: Arc<dyn PendingStore>,
        limiter: Arc<dyn RateLimiter>,
        settings: &FeedbackSettings,
    ) -> Self {
        let pipeline = Arc::new(FeedbackPipeline::new(store.clone()));
        Self {
            membership: MembershipTracker::new(store.clone()),
            conversation: ConversationHandler::new(
                CommandParser::new(settings),
                store.clone(),
                limiter,
                pending.clone(),
                pipeline.clone(),
            ),
            callbacks: CallbackHandler::new(store, pending, pipeline),
        }
    }

    /// Processes one event. Never fails; see [`DispatchOutcome::Failed`].
    pub async fn dispatch<M>(&self, bot: &Bot, messenger: &M, update: &InboundUpdate) -> DispatchOutcome
    where
        M: Messenger + ?Sized,
    {
        let handled = AssertUnwindSafe(self.route(bot, messenger, &update.event))
            .catch_unwind()
            .await;

        match handled {
            Ok(Ok(outcome)) => {
                debug!(bot_id = bot.id, update_id = update.update_id, ?outcome, "update processed");
                outcome
            }
            Ok(Err(e)) => {
                error!(
                    error = %e,
                    bot_id = bot.id,
                    update_id = update.update_id,
                    "failed to process update"
                );
                self.fail(messenger, &update.event).await
            }
            Err(panic) => {
                error!(
                    panic = %panic_message(panic.as_ref()),
                    bot_id = bot.id,
                    update_id = update.update_id,
                    "update handler panicked"
                );
                self.fail(messenger, &update.event).await
            }
        }
    }

    async fn route<M>(
        &self,
        bot: &Bot,
        messenger: &M,
        event: &InboundEvent,
    ) -> Result<DispatchOutcome, FeedbackBotError>
    where
        M: Messenger + ?Sized,
    {
        Ok(match event {
            InboundEvent::MembershipChanged(change) => {
                DispatchOutcome::Membership(self.membership.apply(bot, change).await?)
            }
            InboundEvent::Message(message) if message.chat_type == ChatType::Private => {
                DispatchOutcome::PrivateMessage(
                    self.conversation.handle(bot, messenger, message).await?,
                )
            }
            InboundEvent::SelectionCallback(callback) => {
                DispatchOutcome::Callback(self.callbacks.handle(bot, messenger, callback).await?)
            }
            InboundEvent::Message(_) | InboundEvent::Unsupported => DispatchOutcome::Skipped,
        })
    }

    async fn fail<M>(&self, messenger: &M, event: &InboundEvent) -> DispatchOutcome
    where
        M: Messenger + ?Sized,
    {
        metrics::record_event_failure();
        match event {
            InboundEvent::Message(message) if message.chat_type == ChatType::Private => {
                let lang = Language::detect(message.language_code.as_deref());
                send_localized(messenger, message.chat_id, MessageKey::UnexpectedError, lang)
                    .await;
            }
            _ => {}
        }
        DispatchOutcome::Failed
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::localize;
    use crate::pending::InMemoryPendingStore;
    use crate::ratelimit::SlidingWindowLimiter;
    use crate::testing::{self, RecordingMessenger};
    use async_trait::async_trait;
    use feedbackbot_core::types::{
        ChatMessage, MemberStatus, MembershipChange, PendingSelection, SelectionCallback,
    };
    use std::time::Duration;

    const USER: i64 = 314;

    struct PanickingLimiter;

    impl RateLimiter for PanickingLimiter {
        fn check_and_record(&self, _telegram_user_id: i64) -> bool {
            panic!("limiter exploded");
        }
    }

    struct BrokenPending;

    #[async_trait]
    impl PendingStore for BrokenPending {
        async fn put(&self, _selection: PendingSelection) -> Result<(), FeedbackBotError> {
            Err(FeedbackBotError::Internal("pending store offline".into()))
        }

        async fn get(&self, _user: i64) -> Result<Option<PendingSelection>, FeedbackBotError> {
            Err(FeedbackBotError::Internal("pending store offline".into()))
        }

        async fn take(&self, _user: i64) -> Result<Option<PendingSelection>, FeedbackBotError> {
            Err(FeedbackBotError::Internal("pending store offline".into()))
        }
    }

    fn limiter() -> Arc<dyn RateLimiter> {
        Arc::new(SlidingWindowLimiter::new(10, Duration::from_secs(3600)))
    }

    fn update(event: InboundEvent) -> InboundUpdate {
        InboundUpdate {
            update_id: 1,
            event,
        }
    }

    fn private(text: &str) -> InboundEvent {
        InboundEvent::Message(ChatMessage {
            chat_id: USER,
            chat_type: ChatType::Private,
            sender_id: Some(USER),
            language_code: Some("ru".into()),
            text: Some(text.to_string()),
        })
    }

    #[tokio::test]
    async fn routes_membership_changes() {
        let (store, _dir) = testing::store().await;
        let bot = testing::seed_bot(&store, "acme").await;
        let dispatcher = Dispatcher::new(
            store.clone(),
            Arc::new(InMemoryPendingStore::new()),
            limiter(),
            &FeedbackSettings::default(),
        );
        let messenger = RecordingMessenger::new();

        let outcome = dispatcher
            .dispatch(
                &bot,
                &messenger,
                &update(InboundEvent::MembershipChanged(MembershipChange {
                    chat_id: -100,
                    chat_title: Some("Team".into()),
                    chat_type: ChatType::Group,
                    changed_by: 1,
                    old_status: MemberStatus::Left,
                    new_status: MemberStatus::Member,
                })),
            )
            .await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Membership(MembershipOutcome::Created(_))
        ));
    }

    #[tokio::test]
    async fn group_messages_and_unsupported_events_are_skipped() {
        let (store, _dir) = testing::store().await;
        let bot = testing::seed_bot(&store, "acme").await;
        let dispatcher = Dispatcher::new(
            store.clone(),
            Arc::new(InMemoryPendingStore::new()),
            limiter(),
            &FeedbackSettings::default(),
        );
        let messenger = RecordingMessenger::new();

        let group_message = InboundEvent::Message(ChatMessage {
            chat_id: -100,
            chat_type: ChatType::Supergroup,
            sender_id: Some(USER),
            language_code: None,
            text: Some("hello group".into()),
        });
        for event in [group_message, InboundEvent::Unsupported] {
            let outcome = dispatcher.dispatch(&bot, &messenger, &update(event)).await;
            assert_eq!(outcome, DispatchOutcome::Skipped);
        }
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn routes_private_messages_and_callbacks() {
        let (store, _dir) = testing::store().await;
        let bot = testing::seed_bot(&store, "acme").await;
        let dispatcher = Dispatcher::new(
            store.clone(),
            Arc::new(InMemoryPendingStore::new()),
            limiter(),
            &FeedbackSettings::default(),
        );
        let messenger = RecordingMessenger::new();

        let outcome = dispatcher.dispatch(&bot, &messenger, &update(private("/start"))).await;
        assert_eq!(
            outcome,
            DispatchOutcome::PrivateMessage(PrivateMessageOutcome::Replied(MessageKey::Welcome))
        );

        let callback = InboundEvent::SelectionCallback(SelectionCallback {
            callback_id: "cb".into(),
            chat_id: Some(USER),
            sender_id: USER,
            language_code: None,
            data: Some("fb:1".into()),
        });
        let outcome = dispatcher.dispatch(&bot, &messenger, &update(callback)).await;
        assert_eq!(outcome, DispatchOutcome::Callback(CallbackOutcome::SessionExpired));
    }

    #[tokio::test]
    async fn panic_is_contained_and_reported_to_sender() {
        let (store, _dir) = testing::store().await;
        let bot = testing::seed_bot(&store, "acme").await;
        testing::seed_group(&store, &bot, -100, "G1").await;
        let dispatcher = Dispatcher::new(
            store.clone(),
            Arc::new(InMemoryPendingStore::new()),
            Arc::new(PanickingLimiter),
            &FeedbackSettings::default(),
        );
        let messenger = RecordingMessenger::new();

        let outcome = dispatcher.dispatch(&bot, &messenger, &update(private("hello"))).await;

        assert_eq!(outcome, DispatchOutcome::Failed);
        assert_eq!(
            messenger.texts_to(USER),
            vec![localize(MessageKey::UnexpectedError, Language::Ru).to_string()]
        );
    }

    #[tokio::test]
    async fn handler_error_is_contained() {
        let (store, _dir) = testing::store().await;
        let bot = testing::seed_bot(&store, "acme").await;
        testing::seed_group(&store, &bot, -100, "G1").await;
        testing::seed_group(&store, &bot, -200, "G2").await;
        let dispatcher = Dispatcher::new(
            store.clone(),
            Arc::new(BrokenPending),
            limiter(),
            &FeedbackSettings::default(),
        );
        let messenger = RecordingMessenger::new();

        let outcome = dispatcher.dispatch(&bot, &messenger, &update(private("hello"))).await;
        assert_eq!(outcome, DispatchOutcome::Failed);
        assert_eq!(messenger.texts_to(USER).len(), 1);

        // Callbacks fail without an error reply.
        let callback = InboundEvent::SelectionCallback(SelectionCallback {
            callback_id: "cb".into(),
            chat_id: Some(USER),
            sender_id: USER,
            language_code: None,
            data: Some("fb:1".into()),
        });
        let outcome = dispatcher.dispatch(&bot, &messenger, &update(callback)).await;
        assert_eq!(outcome, DispatchOutcome::Failed);
        assert_eq!(messenger.texts_to(USER).len(), 1);
    }

    #[test]
    fn panic_payloads_are_rendered() {
        let boxed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(boxed.as_ref()), "static");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "non-string panic payload");
    }
}
