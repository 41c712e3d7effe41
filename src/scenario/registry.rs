use std::collections::BTreeMap;
use std::time::Instant;

use futures::future::BoxFuture;
use tracing::{error, info};

use super::ScenarioContext;

pub type ScenarioFn = for<'a> fn(&'a ScenarioContext) -> BoxFuture<'a, anyhow::Result<()>>;

#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub group: &'static str,
    pub description: &'static str,
    run: ScenarioFn,
}

impl Scenario {
    pub fn new(
        name: &'static str,
        group: &'static str,
        description: &'static str,
        run: ScenarioFn,
    ) -> Self {
        Self {
            name,
            group,
            description,
            run,
        }
    }
}

/// 为一组 `async fn(&ScenarioContext) -> anyhow::Result<()>` 生成注册项。
macro_rules! register_scenarios {
    ($registry:expr, $group:literal, { $($name:literal => $func:path : $desc:literal),+ $(,)? }) => {
        $(
            $registry.register($crate::scenario::Scenario::new(
                $name,
                $group,
                $desc,
                |ctx| ::futures::FutureExt::boxed($func(ctx)),
            ));
        )+
    };
}
pub(crate) use register_scenarios;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: Vec<String>,
    pub failed: Vec<String>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 按名称索引的场景表，启动时一次性构建。
#[derive(Default)]
pub struct ScenarioRegistry {
    scenarios: BTreeMap<&'static str, Scenario>,
}

impl ScenarioRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置的全部场景：侧链治理与主链治理两组。
    pub fn standard() -> Self {
        let mut registry = Self::new();
        super::side_chain::register(&mut registry);
        super::governance::register(&mut registry);
        registry
    }

    pub fn register(&mut self, scenario: Scenario) {
        self.scenarios.insert(scenario.name, scenario);
    }

    pub fn get(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.values()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// 执行单个场景，失败与未知名称均记录日志并返回 `false`。
    pub async fn run(&self, name: &str, ctx: &ScenarioContext) -> bool {
        let Some(scenario) = self.get(name) else {
            error!(target: "scenario", name, "未知场景");
            return false;
        };

        info!(target: "scenario", name, group = scenario.group, "开始执行场景");
        let started = Instant::now();
        match (scenario.run)(ctx).await {
            Ok(()) => {
                info!(
                    target: "scenario",
                    name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "场景执行成功"
                );
                true
            }
            Err(err) => {
                error!(
                    target: "scenario",
                    name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = format!("{err:#}"),
                    "场景执行失败"
                );
                false
            }
        }
    }

    /// 依次执行，前一个失败不影响后续场景。
    pub async fn run_all<S: AsRef<str>>(&self, names: &[S], ctx: &ScenarioContext) -> RunSummary {
        let mut summary = RunSummary::default();
        for name in names {
            let name = name.as_ref();
            if self.run(name, ctx).await {
                summary.passed.push(name.to_string());
            } else {
                summary.failed.push(name.to_string());
            }
        }
        summary
    }
}
