use std::env;
use std::io::{self, BufRead, Write};

use dotenv::dotenv;
use log::info;
use reqwest::Client;

use stock_sight::form::{FormController, FormFields, ResultPanel};

const DEFAULT_ENDPOINT: &str = "https://stock-sight-1-d4b2.onrender.com/predict";

/// Prints the prediction (or error text) to stdout, standing in for the
/// result panel of the web front end.
struct TerminalPanel {
    text: String,
}

impl ResultPanel for TerminalPanel {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }
    fn show(&mut self) {
        println!("{}", self.text);
    }
}

#[tokio::main]
async fn main() -> Result<(), stock_sight::BoxError> {
    dotenv().ok();
    env_logger::init();

    let endpoint = env::var("PREDICT_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
    info!("Using predict endpoint: {}", endpoint);

    let controller = FormController::new(Client::new(), endpoint);
    let mut panel = TerminalPanel {
        text: String::new(),
    };

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() == 2 {
        let fields = FormFields {
            symbol: args[0].clone(),
            date: args[1].clone(),
        };
        controller.submit(fields, &mut panel).await;
        return Ok(());
    }

    // Interactive form: keeps accepting submissions until an empty symbol.
    let stdin = io::stdin();
    loop {
        let symbol = prompt(&stdin, "Company symbol: ")?;
        if symbol.is_empty() {
            break;
        }
        let date = prompt(&stdin, "Prediction date (YYYY-MM-DD): ")?;
        controller.submit(FormFields { symbol, date }, &mut panel).await;
    }

    Ok(())
}

fn prompt(stdin: &io::Stdin, label: &str) -> Result<String, io::Error> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    if stdin.lock().read_line(&mut line)? == 0 {
        return Ok(String::new());
    }
    Ok(line.trim().to_string())
}
