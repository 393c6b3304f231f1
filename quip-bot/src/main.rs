//! quip — caption-card bot, console driver.
//!
//! Stands in for the chat transport: reads one message per stdin line,
//! dispatches it through the validation gate, renders the card, and
//! writes the PNG reply to the output directory. `/start` and `/help`
//! answer with usage text, `/quit` exits.

use log::{error, info};
use std::io::BufRead;

use quip_bot::{BotConfig, Dispatcher, RenderService};

const START_TEXT: &str = "\
Welcome to the quip caption bot!

Send a message and get a caption card back.
The first line is drawn in the accent color, the rest in the body color.
Use \\n in a message for a hard line break.

Try: /card theme=dark size=800x400 Hello world

/help shows the full syntax.";

const HELP_TEXT: &str = "\
Usage:
  [/card] [theme=<key>] [size=<W>x<H>] caption text...

Directives are recognized at the front of the message only.
  theme=<key>   pick a card theme (unknown keys fall back to the default)
  size=<W>x<H>  canvas size in pixels

Commands:
  /start  welcome message
  /help   this text
  /quit   exit";

fn main() {
    env_logger::init();

    let config = match BotConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("config: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = std::fs::create_dir_all(&config.out_dir) {
        error!("cannot create output dir {:?}: {e}", config.out_dir);
        std::process::exit(1);
    }

    let dispatcher = Dispatcher::new(config.clone());
    let service = match RenderService::new(config.clone()) {
        Ok(service) => service,
        Err(e) => {
            error!("startup: {e}");
            std::process::exit(1);
        }
    };

    info!(
        "quip ready: {} font families, replies to {:?}",
        service.registry().family_count(),
        config.out_dir,
    );

    let stdin = std::io::stdin();
    let mut seq = 0u32;
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("stdin: {e}");
                break;
            }
        };
        let message = line.trim();
        match message {
            "" => continue,
            "/start" => println!("{START_TEXT}"),
            "/help" => println!("{HELP_TEXT}"),
            "/quit" => break,
            _ => {
                // Console stand-in for a multi-line chat message.
                let message = message.replace("\\n", "\n");
                let request = match dispatcher.parse(&message) {
                    Ok(request) => request,
                    Err(e) => {
                        println!("rejected: {e}");
                        continue;
                    }
                };
                match service.render_image(&request) {
                    Ok(image) => {
                        seq += 1;
                        let path = config
                            .out_dir
                            .join(format!("card-{seq:04}.{}", image.format.extension()));
                        match std::fs::write(&path, &image.bytes) {
                            Ok(()) => println!("card written to {}", path.display()),
                            Err(e) => {
                                error!("[{}] write {path:?}: {e}", request.id);
                                println!("render failed, try again");
                            }
                        }
                    }
                    Err(e) => {
                        // Request-scoped: log it, answer, keep serving.
                        error!("[{}] render failed: {e}", request.id);
                        println!("render failed, try again");
                    }
                }
            }
        }
    }
}
