//! Vitalis - Entry Point
//!
//! Wires the in-memory stores and engines, starts the background cycle
//! scheduler, and offers a small interactive console for exercising the
//! system: attacks, retreats, status queries, manual hospital actions.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio::sync::watch;

use vitalis::combat::AttackKind;
use vitalis::core::config::{load_config, VitalisConfig};
use vitalis::core::error::Result;
use vitalis::core::types::UserId;
use vitalis::economy::EconomyLedger;
use vitalis::hospital::DischargeMode;
use vitalis::identity::IdentityProvider;
use vitalis::service::Service;
use vitalis::vitality::VitalityStore;

const CONFIG_PATH: &str = "vitalis.toml";
const SNAPSHOT_PATH: &str = "vitalis_state.json";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitalis=debug".into()),
        )
        .init();

    let config = if Path::new(CONFIG_PATH).exists() {
        load_config(Path::new(CONFIG_PATH))?
    } else {
        tracing::info!("no {} found, using defaults", CONFIG_PATH);
        VitalisConfig::default()
    };

    tracing::info!("Vitalis starting...");

    let rt = Runtime::new()?;
    let service = Arc::new(Service::new(config));

    if Path::new(SNAPSHOT_PATH).exists() {
        match vitalis::storage::load(Path::new(SNAPSHOT_PATH)) {
            Ok(snapshot) => {
                service.restore(snapshot)?;
                tracing::info!("restored state from {}", SNAPSHOT_PATH);
            }
            Err(e) => {
                tracing::warn!(error = %e, "snapshot load failed, starting fresh");
            }
        }
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = service.scheduler();
    rt.spawn(async move { scheduler.run(shutdown_rx).await });

    println!("\n=== VITALIS ===");
    println!("Combat, stabilization, and hospital care for the role-play economy");
    println!();
    println!("Commands:");
    println!("  register <id> <name>   - Register a player");
    println!("  attack <id> <id>       - Attack another player");
    println!("  retreat <id>           - Flee an open reaction window");
    println!("  status <id>            - Show condition, health, balance");
    println!("  transport <id>         - Send a patient to hospital");
    println!("  heal <id>              - Run paid healing for a patient");
    println!("  discharge <id>         - Voluntary discharge");
    println!("  cycle                  - Run a hospital cycle now");
    println!("  log <id>               - Recent hospital log entries");
    println!("  quit / q               - Exit");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let parts: Vec<&str> = input.trim().split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0] {
            "quit" | "q" => break,
            "register" if parts.len() >= 3 => {
                if let Ok(id) = parts[1].parse::<u64>() {
                    service.directory.register_player(UserId(id), parts[2]);
                    println!("Registered {} as {}", id, parts[2]);
                } else {
                    println!("Bad id: {}", parts[1]);
                }
            }
            "attack" if parts.len() >= 3 => {
                match (parts[1].parse::<u64>(), parts[2].parse::<u64>()) {
                    (Ok(a), Ok(d)) => {
                        let result = rt.block_on(service.combat.attack(
                            UserId(a),
                            UserId(d),
                            AttackKind::Manual,
                        ));
                        match result {
                            Ok(report) => {
                                if report.hit {
                                    println!(
                                        "{} hit {} for {} damage{} ({} HP left)",
                                        report.attacker_name,
                                        report.defender_name,
                                        report.damage,
                                        if report.critical { " (CRITICAL)" } else { "" },
                                        report.defender_health
                                    );
                                } else {
                                    println!(
                                        "{} missed {} ({} vs AC {})",
                                        report.attacker_name,
                                        report.defender_name,
                                        report.attack_total,
                                        report.target_ac
                                    );
                                }
                            }
                            Err(e) => println!("Attack failed: {}", e),
                        }
                    }
                    _ => println!("Usage: attack <id> <id>"),
                }
            }
            "retreat" if parts.len() >= 2 => {
                if let Ok(id) = parts[1].parse::<u64>() {
                    match rt.block_on(service.combat.retreat(UserId(id))) {
                        Ok(()) => println!("Retreated."),
                        Err(e) => println!("Retreat failed: {}", e),
                    }
                }
            }
            "status" if parts.len() >= 2 => {
                if let Ok(id) = parts[1].parse::<u64>() {
                    show_status(&service, UserId(id));
                }
            }
            "transport" if parts.len() >= 2 => {
                if let Ok(id) = parts[1].parse::<u64>() {
                    match rt.block_on(service.hospital.transport(UserId(id))) {
                        Ok(()) => println!("Transported."),
                        Err(e) => println!("Transport failed: {}", e),
                    }
                }
            }
            "heal" if parts.len() >= 2 => {
                if let Ok(id) = parts[1].parse::<u64>() {
                    match rt.block_on(service.hospital.heal_to_stabilization(UserId(id))) {
                        Ok(report) => println!(
                            "{} sessions, +{} HP, cost {}, now {} HP",
                            report.sessions,
                            report.hp_restored,
                            report.total_cost,
                            report.final_health
                        ),
                        Err(e) => println!("Healing failed: {}", e),
                    }
                }
            }
            "discharge" if parts.len() >= 2 => {
                if let Ok(id) = parts[1].parse::<u64>() {
                    match rt
                        .block_on(service.hospital.discharge(UserId(id), DischargeMode::Voluntary))
                    {
                        Ok(()) => println!("Discharged."),
                        Err(e) => println!("Discharge failed: {}", e),
                    }
                }
            }
            "cycle" => {
                let summary = rt.block_on(service.hospital.run_cycle());
                println!(
                    "Cycle: {} transported, {} healed, {} discharged, {} blocked, cost {}",
                    summary.transported,
                    summary.healed,
                    summary.discharged,
                    summary.blocked,
                    summary.total_cost
                );
            }
            "log" if parts.len() >= 2 => {
                if let Ok(id) = parts[1].parse::<u64>() {
                    for entry in service.audit.for_user(UserId(id), 10) {
                        println!(
                            "[{}] {:?} amount={} cost={} success={} {}",
                            entry.timestamp,
                            entry.action,
                            entry.amount,
                            entry.cost,
                            entry.success,
                            entry.details
                        );
                    }
                }
            }
            _ => println!("Unknown command. Try: attack, retreat, status, heal, cycle, quit"),
        }
    }

    let _ = shutdown_tx.send(true);

    match service
        .snapshot()
        .and_then(|s| vitalis::storage::save(Path::new(SNAPSHOT_PATH), &s))
    {
        Ok(()) => tracing::info!("state saved to {}", SNAPSHOT_PATH),
        Err(e) => tracing::warn!(error = %e, "snapshot save failed"),
    }

    tracing::info!("Vitalis shutting down");
    Ok(())
}

fn show_status(service: &Service, user: UserId) {
    let name = service.directory.display_name(user);
    match (
        service.vitality.get_or_create(user),
        service.condition(user),
    ) {
        (Ok(vitality), Ok(state)) => {
            println!(
                "{}: {}/{} HP, level {}, {}",
                name,
                vitality.health,
                vitality.max_health(),
                vitality.level,
                state.label()
            );
            if let Ok(account) = service.ledger.balance(user) {
                println!(
                    "  cash {}, bank {}, credit line {}",
                    account.cash,
                    account.bank,
                    account.credit_line()
                );
            }
            let remaining = service.combat.cooldown_remaining(user);
            if remaining > 0 {
                println!("  cooldown: {}s", remaining);
            }
        }
        (Err(e), _) | (_, Err(e)) => println!("Status failed: {}", e),
    }
}
