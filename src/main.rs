// ==========================================
// 辅祭排班系统 - 命令行入口
// ==========================================
// 用法: liturgy-roster <snapshot.json> [recalc|fill|check|stats] [起始日期 天数] [--aff=MAT,STM]
// 结果写回快照文件,报告以 JSON 输出到 stdout
// ==========================================

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use liturgy_roster::config::ConfigManager;
use liturgy_roster::domain::{Affiliation, Period};
use liturgy_roster::{logging, InMemoryRosterStore, RosterApi, APP_NAME, VERSION};

fn parse_period(args: &[String]) -> anyhow::Result<Option<Period>> {
    match args {
        [] => Ok(None),
        [from, days] => {
            let from = NaiveDate::parse_from_str(from, "%Y-%m-%d")
                .with_context(|| format!("无效起始日期: {}", from))?;
            let days: u32 = days.parse().with_context(|| format!("无效天数: {}", days))?;
            Ok(Some(Period::starting(from, days)?))
        }
        _ => bail!("区间参数应为: <YYYY-MM-DD> <天数>"),
    }
}

/// 取出 --aff=A,B 团体过滤参数,其余按位置参数返回
fn split_affiliations(args: &[String]) -> anyhow::Result<(Vec<Affiliation>, Vec<String>)> {
    let mut affiliations = Vec::new();
    let mut rest = Vec::new();
    for arg in args {
        match arg.strip_prefix("--aff=") {
            Some(codes) => {
                for code in codes.split(',').filter(|code| !code.trim().is_empty()) {
                    affiliations.push(code.parse::<Affiliation>().map_err(anyhow::Error::msg)?);
                }
            }
            None => rest.push(arg.clone()),
        }
    }
    Ok((affiliations, rest))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let (affiliations, args) = split_affiliations(&raw)?;
    let Some(path) = args.first().map(PathBuf::from) else {
        bail!("用法: liturgy-roster <snapshot.json> [recalc|fill|check|stats] [YYYY-MM-DD 天数] [--aff=MAT,STM]");
    };
    let command = args.get(1).map(String::as_str).unwrap_or("recalc");
    let period = parse_period(args.get(2..).unwrap_or(&[]))?;

    tracing::info!(version = VERSION, "{}", APP_NAME);

    let config = ConfigManager::load(None).context("加载配置失败")?;
    let store = Arc::new(InMemoryRosterStore::load_json(&path).await?);
    let api = RosterApi::with_store(store.clone(), Arc::new(config));

    let report = match command {
        "recalc" => serde_json::to_value(api.recalculate(period).await?)?,
        "fill" => serde_json::to_value(api.fill_vacancies(period).await?)?,
        "check" => serde_json::to_value(api.check_schedule(period, &affiliations).await?)?,
        "stats" => serde_json::to_value(api.workload_stats(period, &affiliations).await?)?,
        other => bail!("未知命令: {}", other),
    };

    if matches!(command, "recalc" | "fill") {
        store.save_json(&path).await?;
        tracing::info!(path = %path.display(), "快照已写回");
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn test_period_days_past_calendar_end_is_error() {
        assert!(parse_period(&args(&["2025-08-01", "4000000000"])).is_err());
        let period = parse_period(&args(&["2025-08-01", "31"])).unwrap().unwrap();
        assert_eq!(period.to, NaiveDate::from_ymd_opt(2025, 8, 31).unwrap());
    }

    #[test]
    fn test_affiliation_flag_is_split_out() {
        let (affiliations, rest) =
            split_affiliations(&args(&["roster.json", "--aff=MAT,stm", "check"])).unwrap();
        assert_eq!(affiliations, vec![Affiliation::Mat, Affiliation::Stm]);
        assert_eq!(rest, args(&["roster.json", "check"]));
        assert!(split_affiliations(&args(&["--aff=XYZ"])).is_err());
    }
}
