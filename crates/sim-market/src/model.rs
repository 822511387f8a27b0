//! 레짐 조건부 경험적 틱 모델.
//!
//! 모델 파일은 세 개의 매핑을 가진 JSON 문서입니다:
//! - `transition`: `"모멘텀,브레이크아웃,방향"` → `"델타,스프레드,잔량"` 버킷 → 정수 가중치
//! - `ticks_per_regime`: `"모멘텀,브레이크아웃"` → 관측된 틱 수
//! - `seconds_per_regime`: `"모멘텀,브레이크아웃"` → 관측된 시간 (초)
//!
//! 버킷 값은 고정 배율로 해석합니다 (델타 × 0.005, 스프레드 × 0.01, 잔량 × 100).
//! 배율은 모델 데이터와 함께만 바꿀 수 있습니다.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::{Regime, SimError, SimResult, Sign, KEY_SEPARATOR};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info, warn};

/// 가격 델타 버킷 배율 (통화 단위).
pub const PRICE_DELTA_SCALE: f64 = 0.005;
/// 스프레드 버킷 배율 (통화 단위).
pub const SPREAD_SCALE: f64 = 0.01;
/// 잔량 버킷 배율 (주).
pub const SIZE_SCALE: u64 = 100;

/// 단일 Knuth 추출에 허용하는 최대 λ. 이보다 크면 나눠서 합산합니다.
const MAX_KNUTH_LAMBDA: f64 = 30.0;

/// 허용하는 최대 업데이트 빈도 (초당). 이를 넘는 모델은 손상된 파일로 봅니다.
pub const MAX_UPDATE_RATE: f64 = 10_000.0;

/// 모델 파일 문서.
///
/// 버킷 순서가 시드 재현성에 영향을 주므로 정렬된 맵을 씁니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDocument {
    #[serde(default)]
    pub transition: BTreeMap<String, BTreeMap<String, u64>>,
    #[serde(default)]
    pub ticks_per_regime: BTreeMap<String, f64>,
    #[serde(default)]
    pub seconds_per_regime: BTreeMap<String, f64>,
}

/// 이산화된 (델타, 스프레드, 잔량) 버킷.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickBucket {
    pub delta: i32,
    pub spread: i32,
    pub size: i32,
}

impl TickBucket {
    /// `"델타,스프레드,잔량"` 형식의 버킷 키를 해석합니다.
    pub fn parse(key: &str) -> Result<Self, String> {
        let fields = key
            .split(KEY_SEPARATOR)
            .map(|f| f.trim().parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid bucket key {key:?}: {e}"))?;

        match fields.as_slice() {
            [delta, spread, size] => Ok(Self {
                delta: *delta,
                spread: *spread,
                size: *size,
            }),
            _ => Err(format!(
                "bucket key must have 3 fields, got {}: {key:?}",
                fields.len()
            )),
        }
    }

    /// 버킷을 연속 값으로 변환합니다.
    pub fn decode(&self) -> SampledTick {
        SampledTick {
            price_delta: f64::from(self.delta) * PRICE_DELTA_SCALE,
            spread: f64::from(self.spread) * SPREAD_SCALE,
            size: u64::try_from(self.size.max(0)).unwrap_or(0) * SIZE_SCALE,
        }
    }
}

/// 모델에서 뽑은 원시 틱 값.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledTick {
    pub price_delta: f64,
    pub spread: f64,
    pub size: u64,
}

impl SampledTick {
    /// 키가 없거나 분포가 비었을 때 쓰는 중립 틱.
    pub const FALLBACK: SampledTick = SampledTick {
        price_delta: 0.0,
        spread: 0.01,
        size: 100,
    };
}

/// 한 (레짐, 방향) 키의 가중 버킷 분포.
#[derive(Debug, Clone)]
struct BucketDistribution {
    buckets: Vec<TickBucket>,
    index: WeightedIndex<u64>,
}

/// 레짐 조건부 경험적 빈도 테이블.
///
/// 생성 후에는 읽기 전용입니다.
#[derive(Debug, Clone, Default)]
pub struct RegimeModel {
    transitions: HashMap<(Regime, Sign), BucketDistribution>,
    rates: HashMap<Regime, f64>,
}

impl RegimeModel {
    /// 빈 모델. 모든 조회가 대체값을 반환합니다.
    pub fn empty() -> Self {
        Self::default()
    }

    /// 파일에서 모델을 로드합니다.
    ///
    /// 파일이 없으면 빈 모델을 반환하고, 파일이 있는데 형식이 잘못되었으면
    /// `SimError::ModelFormat`으로 실패합니다.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Model file not found, running on empty model");
            return Ok(Self::empty());
        }

        let content = std::fs::read_to_string(path)?;
        let model = Self::from_json_str(&content)?;
        info!(
            path = %path.display(),
            transitions = model.transitions.len(),
            regimes = model.rates.len(),
            "Regime model loaded"
        );
        Ok(model)
    }

    /// JSON 문자열에서 모델을 만듭니다.
    pub fn from_json_str(s: &str) -> SimResult<Self> {
        let document: ModelDocument = serde_json::from_str(s)
            .map_err(|e| SimError::ModelFormat(format!("invalid model document: {e}")))?;
        Self::from_document(document)
    }

    /// 역직렬화된 문서에서 모델을 만듭니다.
    pub fn from_document(document: ModelDocument) -> SimResult<Self> {
        let mut transitions = HashMap::with_capacity(document.transition.len());

        for (key, buckets) in &document.transition {
            let (regime, sign) =
                Regime::parse_transition_key(key).map_err(SimError::ModelFormat)?;

            let mut parsed = Vec::with_capacity(buckets.len());
            let mut weights = Vec::with_capacity(buckets.len());
            for (bucket_key, weight) in buckets {
                parsed.push(TickBucket::parse(bucket_key).map_err(SimError::ModelFormat)?);
                weights.push(*weight);
            }

            // 가중치 합이 0이거나 버킷이 없으면 분포를 만들지 않고 대체값 정책을 따릅니다.
            match WeightedIndex::new(&weights) {
                Ok(index) => {
                    transitions.insert(
                        (regime, sign),
                        BucketDistribution {
                            buckets: parsed,
                            index,
                        },
                    );
                }
                Err(e) => debug!(key = %key, error = %e, "Skipping empty bucket distribution"),
            }
        }

        let mut rates = HashMap::new();
        for (key, ticks) in &document.ticks_per_regime {
            let regime: Regime = key.parse().map_err(SimError::ModelFormat)?;
            let seconds = document.seconds_per_regime.get(key).copied().unwrap_or(0.0);
            let rate = Self::rate(*ticks, seconds);
            if rate > MAX_UPDATE_RATE {
                return Err(SimError::ModelFormat(format!(
                    "update rate {rate} for {key:?} exceeds {MAX_UPDATE_RATE} per second"
                )));
            }
            rates.insert(regime, rate);
        }
        for key in document.seconds_per_regime.keys() {
            let _: Regime = key.parse().map_err(SimError::ModelFormat)?;
        }

        Ok(Self { transitions, rates })
    }

    /// λ = ticks / max(1, seconds).
    fn rate(ticks: f64, seconds: f64) -> f64 {
        let lambda = ticks / seconds.max(1.0);
        if lambda.is_finite() {
            lambda.max(0.0)
        } else {
            0.0
        }
    }

    /// 레짐의 초당 업데이트 빈도 λ. 기록이 없으면 0.
    pub fn update_rate(&self, regime: Regime) -> f64 {
        self.rates.get(&regime).copied().unwrap_or(0.0)
    }

    /// 전이 분포가 있는 (레짐, 방향) 키 수.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty() && self.rates.is_empty()
    }

    /// 이번 스텝의 업데이트 횟수를 포아송 분포에서 뽑습니다.
    pub fn sample_update_count<R: Rng + ?Sized>(&self, regime: Regime, rng: &mut R) -> u32 {
        sample_poisson(self.update_rate(regime), rng)
    }

    /// (레짐, 방향) 분포에서 원시 틱을 뽑습니다.
    pub fn sample_tick<R: Rng + ?Sized>(
        &self,
        regime: Regime,
        sign: Sign,
        rng: &mut R,
    ) -> SampledTick {
        match self.transitions.get(&(regime, sign)) {
            Some(dist) => dist.buckets[dist.index.sample(rng)].decode(),
            None => SampledTick::FALLBACK,
        }
    }
}

/// 역변환(Knuth) 방식의 정확한 포아송 추출.
///
/// 큰 λ는 `e^-λ` 언더플로를 피하기 위해 30 이하 조각으로 나눠 독립 추출을 합산합니다.
/// λ는 [`MAX_UPDATE_RATE`]로 제한됩니다.
pub fn sample_poisson<R: Rng + ?Sized>(lambda: f64, rng: &mut R) -> u32 {
    if !lambda.is_finite() || lambda <= 0.0 {
        return 0;
    }

    let mut remaining = lambda.min(MAX_UPDATE_RATE);
    let mut total = 0u32;
    while remaining > 0.0 {
        let chunk = remaining.min(MAX_KNUTH_LAMBDA);
        total = total.saturating_add(knuth_poisson(chunk, rng));
        remaining -= chunk;
    }
    total
}

fn knuth_poisson<R: Rng + ?Sized>(lambda: f64, rng: &mut R) -> u32 {
    let limit = (-lambda).exp();
    let mut count = 0u32;
    let mut product: f64 = rng.gen();
    while product > limit {
        count += 1;
        product *= rng.gen::<f64>();
    }
    count
}
