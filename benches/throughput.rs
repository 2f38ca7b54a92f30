use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use rusty_ledger::config::Config;
use rusty_ledger::ids::SystemIdentifiers;
use rusty_ledger::stores::AccountsStore;
use rusty_ledger::{open_account, run, run_async, IdentifierProvider, Ledger};
use std::io;
use std::sync::Arc;
use std::thread;
use tokio::runtime::Runtime;

const THREADS: usize = 8;
const OPS_PER_THREAD: usize = 1_000;

struct NoopWriter;

impl io::Write for NoopWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Just return the length of input without actually writing
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn funded_ledgers(count: usize) -> Vec<Ledger<AccountsStore>> {
    let storage = Arc::new(AccountsStore::new());
    let ids: Arc<dyn IdentifierProvider> = Arc::new(SystemIdentifiers);
    (0..count)
        .map(|i| {
            let owner = format!("owner-{}", i);
            let account = open_account(storage.as_ref(), ids.as_ref(), &owner).unwrap();
            let ledger =
                Ledger::bind(account.id(), Arc::clone(&storage), Arc::clone(&ids)).unwrap();
            ledger.deposit(Decimal::from(THREADS * OPS_PER_THREAD)).unwrap();
            ledger
        })
        .collect()
}

fn contended_withdrawals(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    group.bench_function("withdraw_one_account_8_threads", |b| {
        b.iter_batched(
            || funded_ledgers(1),
            |ledgers| {
                let ledger = &ledgers[0];
                thread::scope(|s| {
                    for _ in 0..THREADS {
                        s.spawn(|| {
                            for _ in 0..OPS_PER_THREAD {
                                ledger.withdraw(dec!(1)).unwrap();
                            }
                        });
                    }
                });
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function("transfer_ring_8_accounts_8_threads", |b| {
        b.iter_batched(
            || funded_ledgers(THREADS),
            |ledgers| {
                thread::scope(|s| {
                    for (i, ledger) in ledgers.iter().enumerate() {
                        let next = ledgers[(i + 1) % ledgers.len()].account_id();
                        s.spawn(move || {
                            for _ in 0..OPS_PER_THREAD {
                                ledger.transfer(next, dec!(1)).unwrap();
                            }
                        });
                    }
                });
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn replay_commands(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");

    group.bench_function("sync_example_commands", |b| {
        b.iter(|| {
            run("data/example_commands.csv", NoopWriter).unwrap();
        });
    });

    group.bench_function("async_example_commands", |b| {
        let rt = Runtime::new().unwrap();
        let config = &Config::default();
        b.to_async(rt).iter(|| async move {
            run_async("data/example_commands.csv", NoopWriter, config)
                .await
                .unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, contended_withdrawals, replay_commands);
criterion_main!(benches);
