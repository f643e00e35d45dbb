//! Update router: classify → query → format → notify.
//!
//! Each event is handled independently; the router holds only immutable,
//! shareable values, so concurrent calls need no coordination.

use crate::{
    domain::{CanonicalStatus, ChatId, Intent},
    formatting,
    intent::{classify, CommandSet},
    messaging::{
        notifier::Notifier,
        types::{Ack, InboundEvent, Reply, ReplyKeyboard},
    },
    repository::StatusRepository,
    Result,
};

#[derive(Clone)]
pub struct UpdateRouter {
    repo: StatusRepository,
    notifier: Notifier,
    commands: CommandSet,
    min_lookup_len: usize,
}

impl UpdateRouter {
    pub fn new(
        repo: StatusRepository,
        notifier: Notifier,
        commands: CommandSet,
        min_lookup_len: usize,
    ) -> Self {
        Self {
            repo,
            notifier,
            commands,
            min_lookup_len,
        }
    }

    pub fn classify(&self, text: &str) -> Option<Intent> {
        classify(text, &self.commands, self.min_lookup_len)
    }

    /// Handle one inbound event. Never fails: problems end up in the reply
    /// text or in `Ack::detail`.
    pub async fn route(&self, event: InboundEvent) -> Ack {
        let Some(chat_id) = event.destination else {
            tracing::debug!("ignoring event without destination");
            return Ack::handled();
        };
        let Some(intent) = self.classify(&event.text) else {
            tracing::debug!(chat_id = chat_id.0, "ignoring empty message");
            return Ack::handled();
        };

        tracing::info!(chat_id = chat_id.0, text = %event.text.trim(), ?intent, "message");

        let reply = self.reply_for(chat_id, intent).await;
        if self.notifier.notify(chat_id, &reply).await {
            Ack::handled()
        } else {
            Ack::handled_with("reply not delivered")
        }
    }

    /// Build the reply for an intent, converting any failure into an error reply.
    pub async fn reply_for(&self, chat_id: ChatId, intent: Intent) -> Reply {
        match self.compute_reply(intent).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(chat_id = chat_id.0, error = %e, "failed to build reply");
                Reply::text(formatting::format_connection_error(&e.user_cause()))
            }
        }
    }

    async fn compute_reply(&self, intent: Intent) -> Result<Reply> {
        let reply = match intent {
            Intent::ShowMenu => {
                Reply::text(formatting::welcome_text()).with_keyboard(self.menu_keyboard())
            }
            Intent::PromptForContainer => Reply::text(formatting::container_prompt_text()),
            Intent::ShowHelp => Reply::text(formatting::help_text(&self.commands)),
            Intent::Unrecognized => Reply::text(formatting::unrecognized_text()),
            Intent::LookupContainer(id) => {
                let result = self.repo.lookup(&id).await;
                Reply::text(formatting::format_query_result(&result))
            }
            Intent::ListUnpaid => {
                let unpaid = self.repo.list_by_status(CanonicalStatus::Unpaid).await?;
                Reply::text(formatting::format_unpaid_list(&unpaid))
            }
            Intent::ShowStatistics => {
                let stats = self.repo.aggregate().await?;
                Reply::text(formatting::format_statistics(&stats))
            }
        };
        Ok(reply)
    }

    fn menu_keyboard(&self) -> ReplyKeyboard {
        ReplyKeyboard::one_per_row(self.commands.menu_labels())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessageId, MessageRef},
        errors::Error,
        messaging::{port::MessagingPort, types::MessagingCapabilities},
        repository::tests::{repo, FakeRows},
    };
    use async_trait::async_trait;
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    #[derive(Default)]
    struct FakeMessenger {
        fail: bool,
        sends: Mutex<Vec<(ChatId, String, Option<ReplyKeyboard>)>>,
    }

    impl FakeMessenger {
        fn sent(&self) -> Vec<(ChatId, String, Option<ReplyKeyboard>)> {
            self.sends.lock().unwrap().clone()
        }

        fn texts(&self) -> Vec<String> {
            self.sent().into_iter().map(|(_, t, _)| t).collect()
        }
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        fn capabilities(&self) -> MessagingCapabilities {
            MessagingCapabilities {
                supports_reply_keyboards: true,
                max_message_len: 4096,
            }
        }

        async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
            self.sends
                .lock()
                .unwrap()
                .push((chat_id, html.to_string(), None));
            if self.fail {
                return Err(Error::External("telegram error: chat not found".into()));
            }
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(1),
            })
        }

        async fn send_with_keyboard(
            &self,
            chat_id: ChatId,
            html: &str,
            keyboard: ReplyKeyboard,
        ) -> Result<MessageRef> {
            self.sends
                .lock()
                .unwrap()
                .push((chat_id, html.to_string(), Some(keyboard)));
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(1),
            })
        }
    }

    fn router(rows: FakeRows, messenger: Arc<FakeMessenger>) -> UpdateRouter {
        UpdateRouter::new(
            repo(Arc::new(rows)),
            Notifier::new(messenger, Duration::from_secs(1)),
            CommandSet::default(),
            6,
        )
    }

    fn sample_rows() -> FakeRows {
        FakeRows::with_rows(&[
            ("TCLU1234567", "Оплачено"),
            ("MSKU7654321", "Оплаты нет"),
            ("CMAU1111111", "Постоплата"),
            ("GESU2222222", "Оплаты нет"),
        ])
    }

    #[tokio::test]
    async fn empty_events_produce_no_reply() {
        let m = Arc::new(FakeMessenger::default());
        let r = router(sample_rows(), m.clone());

        let ack = r.route(InboundEvent::new(ChatId(1), "  ")).await;
        assert_eq!(ack, Ack::handled());
        let ack = r
            .route(InboundEvent {
                destination: None,
                text: "TCLU1234567".into(),
            })
            .await;
        assert_eq!(ack, Ack::handled());
        assert!(m.sent().is_empty());
    }

    #[tokio::test]
    async fn start_sends_menu_keyboard() {
        let m = Arc::new(FakeMessenger::default());
        let r = router(sample_rows(), m.clone());

        r.route(InboundEvent::new(ChatId(5), "/start")).await;
        let sent = m.sent();
        assert_eq!(sent.len(), 1);
        let (chat, text, kb) = &sent[0];
        assert_eq!(*chat, ChatId(5));
        assert!(text.contains("Добро пожаловать"));
        assert_eq!(kb.as_ref().map(|k| k.rows.len()), Some(4));
    }

    #[tokio::test]
    async fn lookup_replies_with_status() {
        let m = Arc::new(FakeMessenger::default());
        let r = router(sample_rows(), m.clone());

        r.route(InboundEvent::new(ChatId(1), " tclu1234567 ")).await;
        r.route(InboundEvent::new(ChatId(1), "/check MSKU7654321")).await;
        r.route(InboundEvent::new(ChatId(1), "ZZZZ0000000")).await;

        let texts = m.texts();
        assert_eq!(texts.len(), 3);
        assert!(texts[0].starts_with("✅") && texts[0].contains("TCLU1234567"));
        assert!(texts[1].starts_with("❌") && texts[1].contains("Оплаты нет"));
        assert!(texts[2].contains("ZZZZ0000000") && texts[2].contains("не найден"));
    }

    #[tokio::test]
    async fn unpaid_and_statistics_replies() {
        let m = Arc::new(FakeMessenger::default());
        let r = router(sample_rows(), m.clone());

        r.route(InboundEvent::new(ChatId(1), "💰 Неоплаченные")).await;
        r.route(InboundEvent::new(ChatId(1), "/stats")).await;

        let texts = m.texts();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains("1. 📦 MSKU7654321"));
        assert!(texts[0].contains("2. 📦 GESU2222222"));
        assert!(texts[1].contains("Всего: <b>4</b>"));
        assert!(texts[1].contains("<b>25%</b>"));
    }

    #[tokio::test]
    async fn short_unknown_text_is_unrecognized() {
        let m = Arc::new(FakeMessenger::default());
        let r = router(sample_rows(), m.clone());

        r.route(InboundEvent::new(ChatId(1), "hello")).await;
        assert_eq!(m.texts(), vec![formatting::unrecognized_text()]);
    }

    #[tokio::test]
    async fn connection_failure_becomes_error_reply() {
        let m = Arc::new(FakeMessenger::default());
        let r = router(FakeRows::failing("invalid credentials"), m.clone());

        for text in ["TCLU1234567", "/unpaid", "📊 Статистика"] {
            let ack = r.route(InboundEvent::new(ChatId(1), text)).await;
            assert!(ack.handled);
            assert_eq!(ack.detail, None);
        }
        let texts = m.texts();
        assert_eq!(texts.len(), 3);
        for t in texts {
            assert!(t.contains("Ошибка подключения"), "{t}");
            assert!(t.contains("invalid credentials"), "{t}");
        }
    }

    #[tokio::test]
    async fn delivery_failure_is_swallowed() {
        let m = Arc::new(FakeMessenger {
            fail: true,
            ..Default::default()
        });
        let r = router(sample_rows(), m.clone());

        let ack = r.route(InboundEvent::new(ChatId(1), "/help")).await;
        assert!(ack.handled);
        assert!(ack.detail.is_some());
        // No second "error" message after the failed send.
        assert_eq!(m.sent().len(), 1);
    }

    #[tokio::test]
    async fn identical_events_give_identical_replies() {
        let m = Arc::new(FakeMessenger::default());
        let r = router(sample_rows(), m.clone());

        for _ in 0..2 {
            r.route(InboundEvent::new(ChatId(1), "/stats")).await;
            r.route(InboundEvent::new(ChatId(1), "MSKU7654321")).await;
        }
        let texts = m.texts();
        assert_eq!(texts[0], texts[2]);
        assert_eq!(texts[1], texts[3]);
    }

    #[tokio::test]
    async fn oversized_input_yields_well_formed_html() {
        let m = Arc::new(FakeMessenger::default());
        let r = router(sample_rows(), m.clone());

        let inputs = [
            "MSKU1234567\n".repeat(340),
            "&".repeat(4000),
            "<b>".repeat(1500),
        ];
        for text in &inputs {
            r.route(InboundEvent::new(ChatId(1), text.as_str())).await;
        }

        let texts = m.texts();
        assert_eq!(texts.len(), 3);
        for t in texts {
            assert!(t.chars().count() <= 4096, "{} chars", t.chars().count());
            assert_eq!(t.matches("<b>").count(), t.matches("</b>").count(), "{t}");
            for (i, _) in t.match_indices('&') {
                let rest = &t[i..];
                assert!(
                    ["&amp;", "&lt;", "&gt;", "&quot;"].iter().any(|e| rest.starts_with(e)),
                    "split entity in {t}"
                );
            }
        }
    }
}
