//! 매수 금액(센트)을 자산 수량으로 변환.

use crate::error::ExchangeError;

/// 매도 호가로 센트 금액에 해당하는 매수 수량을 계산합니다.
///
/// `volume = (1 / quote) / 100 * amount_in_cents`
pub fn buy_volume(amount_in_cents: i64, quote: f64) -> Result<f64, ExchangeError> {
    if amount_in_cents <= 0 {
        return Err(ExchangeError::InvalidQuantity(format!(
            "amount_in_cents must be positive: {}",
            amount_in_cents
        )));
    }
    if !quote.is_finite() || quote <= 0.0 {
        return Err(ExchangeError::InvalidQuantity(format!(
            "ask price must be positive: {}",
            quote
        )));
    }

    // 1 USD로 살 수 있는 수량을 센트 기준으로 환산
    let dollar_rate = 1.0 / quote;
    let cents_rate = dollar_rate / 100.0;
    let volume = cents_rate * amount_in_cents as f64;

    if !volume.is_finite() || volume <= 0.0 {
        return Err(ExchangeError::InvalidQuantity(format!(
            "computed volume is not positive: {}",
            volume
        )));
    }
    Ok(volume)
}

/// 주문 수량을 지수 표기 없이 최대 정밀도로 포맷합니다.
pub fn format_volume(volume: f64) -> String {
    volume.to_string()
}
