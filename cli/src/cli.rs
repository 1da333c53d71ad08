mod commands;

use std::io::{self, BufRead, Write};

use anyhow::{Context as _, Result, anyhow};
use galaxy_economy_core::{
    Credits, Simulation, StarSystem, SystemId, credits_to_string, price_to_string,
};

use commands::{CommandRegistry, Context};

const PRICE_DECIMALS: i32 = 1;

pub fn run(sim: &mut Simulation) -> Result<()> {
    print_intro(sim);
    let registry = CommandRegistry::default();
    let stdin = io::stdin();

    loop {
        print!("{}> ", sim.now());
        io::stdout()
            .flush()
            .context("プロンプトのフラッシュに失敗しました")?;

        let mut line = String::new();
        let bytes = stdin
            .lock()
            .read_line(&mut line)
            .context("入力の読み込みに失敗しました")?;

        if bytes == 0 {
            println!("入力が終了したためシミュレーションを終了します。");
            return Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut ctx = Context::new(sim);
        if let Err(error) = registry.execute_input(&mut ctx, trimmed) {
            println!("エラー: {error:#}");
        }
    }
}

fn print_intro(sim: &Simulation) {
    println!("銀河経済シミュレーターへようこそ。");
    println!(
        "{} 星系 / {} 商品を読み込みました。",
        sim.galaxy().system_count(),
        sim.economy().catalog().len()
    );
    println!("名前に空白を含む場合は _ で区切ってください (例: Gamma_Polaris)。");
    println!("help で利用可能なコマンド一覧を表示します。");
}

fn print_help() {
    println!("利用可能なコマンド:");
    println!("  overview                    星系の一覧を表示");
    println!("  system <星系>               星系と惑星の詳細を表示");
    println!("  price <商品> <星系> <惑星>  現在価格を表示");
    println!("  prices <星系> [惑星]        惑星ごとの価格表を表示");
    println!("  solver [商品]               ノード解析の価格係数を表示");
    println!("  tick <STP>                  時間を進める (1 STP = 離着陸1回分)");
    println!("  link <星系> <星系>          ジャンプ航路を追加");
    println!("  unlink <星系> <星系>        ジャンプ航路を削除");
    println!("  refresh                     価格ネットワークを再構築");
    println!("  credits <金額> [小数桁]     金額を略記で表示 (負の桁数で完全表記)");
    println!("  quit                        シミュレーションを終了");
}

fn print_overview(sim: &Simulation) {
    let galaxy = sim.galaxy();
    println!(
        "ID | {:<16} | {:<10} | {:>5} | {:>4} | {:>8} | {:>8}",
        "星系", "勢力", "航路", "惑星", "密度", "変動"
    );
    for system in galaxy.systems() {
        println!(
            "{:>2} | {:<16} | {:<10} | {:>5} | {:>4} | {:>8.1} | {:>8.1}",
            system.id.index() + 1,
            system.name,
            galaxy.faction_name(system.faction).unwrap_or("-"),
            system.jump_count(),
            system.planets.len(),
            system.nebula.density,
            system.nebula.volatility
        );
    }
}

fn print_system_details(sim: &Simulation, id: SystemId) -> Result<()> {
    let galaxy = sim.galaxy();
    let system = galaxy
        .system(id)
        .ok_or_else(|| anyhow!("星系が存在しません: {}", id))?;
    println!("-- {} --", system.name);
    println!("勢力: {}", galaxy.faction_name(system.faction).unwrap_or("なし"));
    println!("半径: {:.0}", system.radius);
    println!("干渉: {:.1}", system.interference);
    println!(
        "星雲: 密度 {:.1} / 変動 {:.1}",
        system.nebula.density, system.nebula.volatility
    );
    let jumps: Vec<&str> = system
        .jumps()
        .iter()
        .filter_map(|target| galaxy.system(*target))
        .map(|target| target.name.as_str())
        .collect();
    println!("航路: {}", if jumps.is_empty() { "なし".to_string() } else { jumps.join(", ") });
    println!("惑星:");
    for (idx, planet) in system.planets.iter().enumerate() {
        println!(
            "  {:>2}: {:<20} 分類 {:<8} 人口 {:>14} 勢力 {}",
            idx + 1,
            planet.name,
            planet.class,
            planet.population,
            galaxy.faction_name(planet.faction).unwrap_or("-")
        );
    }
    Ok(())
}

fn print_price_table(sim: &Simulation, system: &StarSystem, planet: Option<&str>) {
    let economy = sim.economy();
    for candidate in &system.planets {
        if planet.is_some_and(|name| !candidate.name.eq_ignore_ascii_case(name)) {
            continue;
        }
        println!("-- {} ({}) --", candidate.name, system.name);
        let Some(prices) = economy.planet_prices(system.id, &candidate.name) else {
            println!("  取引可能な商品はありません");
            continue;
        };
        for commodity in economy.catalog().sorted_for_display() {
            let Some(id) = economy.catalog().id_of(&commodity.name) else {
                continue;
            };
            let Some(value) = prices.get(id) else {
                continue;
            };
            let price = sim.price(&commodity.name, system.id, &candidate.name);
            let multiplier = economy
                .multiplier(id, system.id)
                .map(|m| format!("{m:.3}"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<18} {:>8} (基準 {:>8.1} ±{:>6.1}) 係数 {}",
                commodity.name,
                credits_to_string(price, PRICE_DECIMALS),
                value.price,
                value.amplitude(),
                multiplier
            );
        }
    }
}

fn print_credits(amount: Credits, decimals: i32, available: Option<Credits>) {
    match available {
        Some(available) => {
            let text = price_to_string(amount, available, decimals);
            let marker = if text.affordable { "" } else { " (所持金不足)" };
            println!("{}{}", text.text, marker);
        }
        None => println!("{}", credits_to_string(amount, decimals)),
    }
}

/// Underscores stand in for spaces in names typed at the prompt.
fn normalise_name(token: &str) -> String {
    token.replace('_', " ")
}

fn resolve_system(sim: &Simulation, token: &str) -> Result<SystemId> {
    let galaxy = sim.galaxy();
    if let Ok(number) = token.parse::<usize>() {
        if (1..=galaxy.system_count()).contains(&number) {
            return Ok(SystemId(number - 1));
        }
    }
    galaxy.find_system(&normalise_name(token)).ok_or_else(|| {
        anyhow!(
            "星系を特定できませんでした: {} (番号か星系名を入力してください)",
            token
        )
    })
}

fn resolve_planet(system: &StarSystem, token: &str) -> Result<String> {
    if let Ok(number) = token.parse::<usize>() {
        if let Some(planet) = number.checked_sub(1).and_then(|idx| system.planets.get(idx)) {
            return Ok(planet.name.clone());
        }
    }
    system
        .find_planet(&normalise_name(token))
        .map(|planet| planet.name.clone())
        .ok_or_else(|| anyhow!("惑星を特定できませんでした: {} ({})", token, system.name))
}

fn resolve_commodity(sim: &Simulation, token: &str) -> Result<String> {
    let name = normalise_name(token);
    sim.economy()
        .catalog()
        .commodities()
        .iter()
        .find(|commodity| commodity.name.eq_ignore_ascii_case(&name))
        .map(|commodity| commodity.name.clone())
        .ok_or_else(|| anyhow!("商品を特定できませんでした: {}", token))
}

fn parse_credits(token: &str) -> Result<Credits> {
    token
        .replace(',', "")
        .parse()
        .map_err(|_| anyhow!("金額は整数で指定してください: {}", token))
}
