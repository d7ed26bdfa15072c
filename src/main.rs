use clap::Parser;
use spotify_lyrics_ratui::app::App;
use spotify_lyrics_ratui::auth::{FileTokenStorage, Session, SystemClock, authorize};
use spotify_lyrics_ratui::backend::BackendClient;
use spotify_lyrics_ratui::cli::{Cli, Command, parse_line};
use spotify_lyrics_ratui::error::AppError;
use spotify_lyrics_ratui::lyrics::{format_time, language_name};
use spotify_lyrics_ratui::messages::app::{AppCommand, AppEvent};
use spotify_lyrics_ratui::spotify::SpotifyClient;
use spotify_lyrics_ratui::{core, logging, settings};

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let cfg = cli.client_config();

    let _log_guard = logging::init(
        &cfg.data_dir,
        logging::LogConfig {
            dir: cli.log_dir.clone(),
            filter: cli.log_filter.clone(),
        },
    );
    tracing::info!(data_dir = %cfg.data_dir.display(), "spotify-lyrics-ratui 启动");

    let settings = settings::load_settings(&cfg.data_dir);
    let backend = BackendClient::new(cfg.clone(), &settings)?;
    let storage = Arc::new(FileTokenStorage::open(&cfg.data_dir)?);
    let session = Arc::new(Session::new(
        backend.clone(),
        storage,
        Arc::new(SystemClock),
    ));

    match cli.command.unwrap_or(Command::Watch) {
        Command::LoginUrl => {
            let state = authorize::generate_state();
            println!("{}", authorize::authorize_url(&cfg, &state)?);
            Ok(())
        }
        Command::Login { code } => {
            session.login(&code).await?;
            println!("登录成功");
            Ok(())
        }
        Command::Logout => {
            session.restore().await;
            session.logout().await;
            println!("已注销");
            Ok(())
        }
        Command::Status => {
            if !session.restore().await {
                println!("未登录");
                return Ok(());
            }
            match session.remaining_validity().await {
                Some(remaining) => println!(
                    "已登录，access token 剩余 {}",
                    format_time(u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX))
                ),
                None => println!("登录已过期，请重新登录"),
            }
            Ok(())
        }
        Command::Watch => {
            if !session.restore().await {
                println!("未登录，请先运行 `login-url` 与 `login --code <code>`");
                return Ok(());
            }
            let _refresh_timer = session.spawn_refresh_timer(settings.refresh_leeway());
            let spotify = SpotifyClient::new(cfg.clone(), &settings, Arc::clone(&session))?;
            let (tx, rx) =
                core::spawn_app_actor(session, spotify, backend, settings, cfg.data_dir.clone());
            run_watch(tx, rx).await
        }
    }
}

async fn run_watch(
    tx: mpsc::Sender<AppCommand>,
    mut rx: mpsc::Receiver<AppEvent>,
) -> Result<(), AppError> {
    let send = |cmd| {
        let tx = tx.clone();
        async move {
            if tx.send(cmd).await.is_err() {
                tracing::warn!("AppActor 已退出");
            }
        }
    };
    send(AppCommand::Bootstrap).await;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut printer = Printer::default();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                send(AppCommand::Quit).await;
                break;
            }
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match parse_line(&line) {
                    Some(AppCommand::Quit) => {
                        send(AppCommand::Quit).await;
                        break;
                    }
                    Some(cmd) => send(cmd).await,
                    None => println!("未知指令: {}", line.trim()),
                },
                // 标准输入关闭后只跟随输出
                Ok(None) | Err(_) => stdin_open = false,
            },
            evt = rx.recv() => match evt {
                Some(AppEvent::State(app)) => printer.print(&app),
                Some(AppEvent::Error(msg)) => eprintln!("错误: {msg}"),
                Some(AppEvent::LoggedOut) => {
                    println!("会话已注销，请重新登录");
                    break;
                }
                None => break,
            },
        }
    }
    Ok(())
}

/// 只在切歌、换行或出现新提示时输出
#[derive(Default)]
struct Printer {
    track: Option<(String, String)>,
    line: Option<usize>,
    translated: bool,
    notice: Option<String>,
}

impl Printer {
    fn print(&mut self, app: &App) {
        if app.notice.is_some() && app.notice != self.notice {
            println!("{}", app.notice.as_deref().unwrap_or_default());
        }
        self.notice = app.notice.clone();

        let Some(track) = &app.current_track else {
            self.track = None;
            return;
        };
        let key = (track.track_name.clone(), track.artist_name.clone());
        if self.track.as_ref() != Some(&key) {
            println!(
                "\n♪ {} - {} [{}]  ({} → {})",
                track.track_name,
                track.artist_name,
                format_time(track.duration_ms),
                language_name(&app.from_lang),
                language_name(&app.to_lang),
            );
            self.track = Some(key);
            self.line = None;
            self.translated = false;
        }

        let translated = app.lyrics.iter().any(|l| !l.translated_text.is_empty());
        if app.current_line == self.line && translated == self.translated {
            return;
        }
        self.line = app.current_line;
        self.translated = translated;

        if let Some(line) = app.current_line.and_then(|i| app.lyrics.get(i)) {
            println!("[{}] {}", format_time(line.start_time_ms), line.original_text);
            if !line.translated_text.is_empty() {
                println!("        {}", line.translated_text);
            }
        }
    }
}
