//! Chat command parsing

use crate::error::{Result, StockError};

/// Greeting for `/start`
pub const START_TEXT: &str = "Привет! Я бот для анализа акций технологических компаний за 2024 год! 📈\n\n\
Для начала напиши запрос, например:\n\
• 'Покажи график Apple за март'\n\
• 'Анализ Циско в период с апреля по август'\n\
• 'Статистика NVIDIA за первое полугодие'";

/// Reply for `/help`
pub const HELP_TEXT: &str = "Я понимаю запросы на естественном языке:\n\
• График [компания] за [период]\n\
• Анализ [компания] за [период]\n\
• Статистика [компания] за [период]\n\n\
Пример: 'Покажи график Apple за март 2024'";

/// Parsed chat input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Greeting
    Start,
    /// Usage hints
    Help,
    /// Leave an interactive session
    Exit,
    /// Free-form request about a stock
    Query { text: String },
}

impl Command {
    /// Parse a line of user input
    ///
    /// Lines starting with `/` are commands, everything else is a query.
    /// Telegram-style `/help@botname` suffixes are accepted.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(StockError::CommandError("Empty input".to_string()));
        }

        let Some(rest) = input.strip_prefix('/') else {
            return Ok(Command::Query {
                text: input.to_string(),
            });
        };

        let name = rest
            .split_whitespace()
            .next()
            .and_then(|word| word.split('@').next())
            .unwrap_or_default()
            .to_lowercase();

        match name.as_str() {
            "start" | "старт" => Ok(Command::Start),
            "help" | "h" | "?" | "помощь" => Ok(Command::Help),
            "exit" | "quit" | "q" | "выход" => Ok(Command::Exit),
            "" => Err(StockError::CommandError("Empty command".to_string())),
            _ => Err(StockError::CommandError(format!("Unknown command: /{name}"))),
        }
    }
}
