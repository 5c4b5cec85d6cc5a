//! Prompt templates for the remote model
//!
//! Both prompts are MiniJinja templates. Numbers are formatted before they
//! reach the template so the prompt text is stable across locales.

use crate::error::Result;
use crate::stats::{StockStatistics, format_thousands};
use chrono::NaiveDate;
use minijinja::Environment;
use serde_json::json;

const CLASSIFIER_TEMPLATE: &str = "Извлеки структуру запроса об акциях технологических компаний \
за {{ year }} год. Ответь ТОЛЬКО JSON без пояснений. Ключи: \
ticker (тикер), start_date (YYYY-MM-DD), end_date (YYYY-MM-DD), \
request_type (graph|stats|analysis). \
Если чего-то нет в сообщении, оставь пустую строку или null.
Пользователь говорит: \"{{ message }}\". Верни только JSON.";

const ANALYSIS_TEMPLATE: &str = "Дай краткий (3-4 предложения) анализ акции за указанный период. \
Не пиши вступлений. Формат: тренд, волатильность/риски, активность, вывод.
Тикер: {{ ticker }}
Период: {{ start_date }} - {{ end_date }}
Старт: ${{ start_price }}, конец: ${{ end_price }}
Изменение: {{ change_percent }}%
Мин/макс: ${{ min_price }} / ${{ max_price }}
Средняя: ${{ average_price }}, волатильность: ${{ volatility }}
Объем: {{ total_volume }}, дней: {{ days_count }}";

fn render(name: &str, source: &str, vars: &serde_json::Value) -> Result<String> {
    let mut env = Environment::new();
    env.add_template(name, source)?;
    Ok(env.get_template(name)?.render(vars)?)
}

/// Instruction asking the model to classify `message` as a JSON object
pub fn classifier_prompt(message: &str) -> Result<String> {
    render(
        "classifier",
        CLASSIFIER_TEMPLATE,
        &json!({ "year": crate::query::DATA_YEAR, "message": message }),
    )
}

/// Instruction asking the model for a short commentary on `stats`
pub fn analysis_prompt(
    ticker: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    stats: &StockStatistics,
) -> Result<String> {
    let vars = json!({
        "ticker": ticker,
        "start_date": start_date.to_string(),
        "end_date": end_date.to_string(),
        "start_price": format!("{:.2}", stats.start_price),
        "end_price": format!("{:.2}", stats.end_price),
        "change_percent": format!("{:.1}", stats.price_change_percent),
        "min_price": format!("{:.2}", stats.min_price),
        "max_price": format!("{:.2}", stats.max_price),
        "average_price": format!("{:.2}", stats.average_price),
        "volatility": format!("{:.2}", stats.volatility),
        "total_volume": format_thousands(stats.total_volume),
        "days_count": stats.days_count,
    });

    render("analysis", ANALYSIS_TEMPLATE, &vars)
}
