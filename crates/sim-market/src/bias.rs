//! 목표가 편향 함수.
//!
//! 모델이 뽑은 델타에 목표가 방향의 당김 항을 볼록 결합합니다.
//! 두 상한(편향 계수 0.7, 스텝 크기 0.05)과 0.1% 근접 시 우회 규칙이
//! 목표가에 부드럽게 다가가는 궤적을 만듭니다.

/// 이 비율 이내로 목표가에 가까우면 모델 델타를 그대로 씁니다.
pub const PROXIMITY_RATIO: f64 = 0.001;
/// 거리 비율에 곱하는 긴급도 기울기 (약 5% 거리에서 포화).
pub const URGENCY_SLOPE: f64 = 20.0;
/// 목표 방향 성분의 최대 비중.
pub const MAX_BIAS_FACTOR: f64 = 0.7;
/// 한 틱당 목표 방향 이동 상한 (통화 단위).
pub const MAX_STEP: f64 = 0.05;
/// 남은 거리 중 한 틱에 당기는 비율.
const STEP_FRACTION: f64 = 0.1;

/// 목표가 쪽으로 편향된 델타를 계산합니다.
///
/// # 인자
///
/// * `model_delta` - 모델이 뽑은 편향 전 델타
/// * `current_price` - 생성기의 현재가
/// * `target_price` - 목표가
pub fn target_biased_delta(model_delta: f64, current_price: f64, target_price: f64) -> f64 {
    let distance = target_price - current_price;

    if current_price <= 0.0 || distance.abs() <= current_price * PROXIMITY_RATIO {
        return model_delta;
    }

    let direction = distance.signum();
    let urgency = (distance.abs() / current_price * URGENCY_SLOPE).clamp(0.0, 1.0);
    let bias_factor = MAX_BIAS_FACTOR * urgency;
    let step = MAX_STEP.min(distance.abs() * STEP_FRACTION);

    bias_factor * (direction * step) + (1.0 - bias_factor) * model_delta
}
