use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::BotCommand};

use cstat_core::{
    config::Config,
    messaging::{notifier::Notifier, port::MessagingPort},
    ports::RowSource,
    repository::StatusRepository,
    router::UpdateRouter,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<UpdateRouter>,
}

impl AppState {
    pub fn new(
        cfg: &Config,
        source: Arc<dyn RowSource>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        let repo = StatusRepository::new(
            source,
            Arc::new(cfg.status_vocabulary.clone()),
            cfg.fetch_timeout,
        );
        let notifier = Notifier::new(messenger, cfg.send_timeout);
        let router = UpdateRouter::new(repo, notifier, cfg.commands.clone(), cfg.min_lookup_len);
        Self {
            router: Arc::new(router),
        }
    }
}

pub async fn run_polling(cfg: Arc<Config>, source: Arc<dyn RowSource>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Basic startup info.
    match bot.get_me().await {
        Ok(me) => tracing::info!(username = %me.username(), "bot started"),
        Err(e) => tracing::warn!(error = %e, "getMe failed; continuing"),
    }
    tracing::info!(
        sheet = %cfg.sheet_name,
        vocabulary = cfg.status_vocabulary.spelling_count(),
        "reading container statuses"
    );

    // Best-effort: the slash-command menu in Telegram clients.
    if let Err(e) = bot.set_my_commands(bot_commands(&cfg)).await {
        tracing::warn!(error = %e, "failed to register bot commands");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState::new(&cfg, source, messenger));

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn bot_commands(cfg: &Config) -> Vec<BotCommand> {
    let slash = |keys: &[String]| {
        keys.iter()
            .find_map(|k| k.strip_prefix('/'))
            .map(|k| k.to_string())
    };
    let c = &cfg.commands;
    [
        (Some("start".to_string()), "Главное меню"),
        (slash(&c.check), "Проверить контейнер"),
        (slash(&c.unpaid), "Неоплаченные"),
        (slash(&c.statistics), "Статистика"),
        (slash(&c.help), "Справка"),
    ]
    .into_iter()
    .filter_map(|(cmd, desc)| cmd.map(|cmd| BotCommand::new(cmd, desc)))
    .collect()
}
