//! 순서가 있는 폴백 체인.
//!
//! "소스를 시도하고, 실패하면 다음 소스로" 패턴을 하나의 실행기로 통일합니다.
//! 각 단계는 `Attempt::Hit` 또는 `Attempt::Miss`를 돌려주며, 실행기는 첫 `Hit`에서
//! 멈춥니다. 같은 단계를 재시도하지 않습니다.

use async_trait::async_trait;
use tracing::debug;

/// 단계 하나의 시도 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    /// 사용할 수 있는 값
    Hit(T),
    /// 다음 단계로 넘어감 (사유)
    Miss(String),
}

impl<T> Attempt<T> {
    pub fn miss(reason: impl Into<String>) -> Self {
        Attempt::Miss(reason.into())
    }
}

/// 폴백 체인의 단계.
#[async_trait]
pub trait FallbackStep<I: ?Sized + Sync, T: Send>: Send + Sync {
    /// 로그와 결과 보고에 쓰이는 단계 이름.
    fn name(&self) -> &str;

    /// 입력에 대해 한 번 시도합니다. 오류는 `Miss`로 흡수해야 합니다.
    async fn attempt(&self, input: &I) -> Attempt<T>;
}

/// 체인 실행 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutcome<T> {
    /// 첫 `Hit` 값
    pub value: Option<T>,
    /// 값을 만든 단계 이름
    pub selected: Option<String>,
    /// 실제로 시도한 단계 이름 (순서대로)
    pub tried: Vec<String>,
    /// 넘어간 단계와 사유
    pub misses: Vec<(String, String)>,
}

/// 순서가 있는 단계 목록을 평가하는 실행기.
pub struct FallbackChain<'a, I: ?Sized + Sync, T: Send> {
    label: &'static str,
    steps: Vec<Box<dyn FallbackStep<I, T> + 'a>>,
}

impl<'a, I: ?Sized + Sync, T: Send> FallbackChain<'a, I, T> {
    /// 빈 체인을 생성합니다.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            steps: Vec::new(),
        }
    }

    /// 단계를 끝에 추가합니다.
    pub fn step(mut self, step: impl FallbackStep<I, T> + 'a) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// 조건이 참일 때만 단계를 추가합니다.
    pub fn step_if(self, condition: bool, step: impl FallbackStep<I, T> + 'a) -> Self {
        if condition {
            self.step(step)
        } else {
            self
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 첫 `Hit`이 나올 때까지 단계를 순서대로 시도합니다.
    pub async fn run(&self, input: &I) -> ChainOutcome<T> {
        let mut tried = Vec::with_capacity(self.steps.len());
        let mut misses = Vec::new();

        for step in &self.steps {
            let name = step.name().to_string();
            tried.push(name.clone());

            match step.attempt(input).await {
                Attempt::Hit(value) => {
                    debug!(chain = self.label, step = %name, "fallback step hit");
                    return ChainOutcome {
                        value: Some(value),
                        selected: Some(name),
                        tried,
                        misses,
                    };
                }
                Attempt::Miss(reason) => {
                    debug!(chain = self.label, step = %name, reason = %reason, "fallback step missed");
                    misses.push((name, reason));
                }
            }
        }

        ChainOutcome {
            value: None,
            selected: None,
            tried,
            misses,
        }
    }
}
