//! Rule-based commentary

use crate::stats::StockStatistics;

/// Heading of every rule-based commentary
pub const NARRATOR_HEADING: &str = "Аналитика (анализ на правилах):\n\n";

const HIGH_VOLUME: f64 = 50_000_000.0;

/// Four-sentence commentary derived from fixed thresholds
///
/// Sentences, in order: trend by percent change, risk by volatility,
/// activity by average daily volume, verdict.
pub fn narrate(stats: &StockStatistics, ticker: &str) -> String {
    let mut text = String::from(NARRATOR_HEADING);
    text.push_str(&trend_sentence(stats.price_change_percent, ticker));
    text.push_str(risk_sentence(stats.volatility));
    text.push_str(activity_sentence(stats.average_volume()));
    text.push_str(verdict(stats.price_change_percent, stats.volatility));
    text
}

fn trend_sentence(pct: f64, ticker: &str) -> String {
    if pct > 10.0 {
        format!("Сильный тренд - акция {ticker} выросла на {pct:.1}%, демонстрируя отличную динамику. ")
    } else if pct > 2.0 {
        format!("↗️ Умеренный рост - {ticker} показала позитивную динамику с ростом {pct:.1}%. ")
    } else if pct > -2.0 {
        format!("➡️ Боковой тренд - цена колебалась в узком диапазоне ({pct:.1}%). ")
    } else if pct > -10.0 {
        format!(
            "↘️ Коррекция - {ticker} снизилась на {:.1}%, что может быть временной коррекцией. ",
            pct.abs()
        )
    } else {
        format!(
            "📉 Сильное падение - значительное снижение на {:.1}% требует внимания. ",
            pct.abs()
        )
    }
}

fn risk_sentence(volatility: f64) -> &'static str {
    if volatility > 8.0 {
        "Высокая волатильность указывает на повышенные риски. "
    } else if volatility > 3.0 {
        "Умеренная волатильность соответствует рыночным ожиданиям. "
    } else {
        "Низкая волатильность говорит о стабильности. "
    }
}

fn activity_sentence(average_volume: f64) -> &'static str {
    if average_volume > HIGH_VOLUME {
        "Высокие объемы торгов подтверждают интерес инвесторов. "
    } else {
        "Объемы торгов в рамках средних значений. "
    }
}

fn verdict(pct: f64, volatility: f64) -> &'static str {
    if pct > 5.0 && volatility < 5.0 {
        "📊 Вывод: Перспективная динамика с управляемыми рисками."
    } else if pct < -5.0 {
        "📊 Вывод: Требуется осторожность из-за негативной динамики."
    } else {
        "📊 Вывод: Нейтральная картина, рекомендуется мониторинг."
    }
}
