use burn::{
    lr_scheduler::{exponential::ExponentialLrScheduler, LrScheduler},
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::AdamWConfig,
    tensor::backend::AutodiffBackend,
};

use super::{
    artifacts::ArtifactStore,
    config::RunConfig,
    evaluation::{evaluate, Evaluator, Split},
    logs::{FoldLog, LogEntry, RunLog},
    schedule::epoch_schedule,
    training::train_one_epoch,
};
use crate::{
    datasets::{Example, FoldData, FoldSource},
    models::{Architecture, Tagger},
};

/// Train and evaluate one model per fold, persisting every completed fold.
///
/// For each fold the backend is seeded, a fresh model, optimizer, scheduler and loss are built,
/// all splits are evaluated as a baseline, `max_epochs` epochs each train once and evaluate the
/// validation split, and all splits are evaluated again. The fold checkpoint is then saved and the
/// whole run log rewritten, so every fold in the log has a checkpoint. An error stops the run;
/// folds that completed stay on disk.
pub fn run<B, S, E>(
    config: &RunConfig,
    source: &S,
    store: &ArtifactStore,
    evaluator: &E,
    device: &B::Device,
) -> anyhow::Result<RunLog>
where
    B: AutodiffBackend,
    S: FoldSource,
    E: Evaluator,
{
    config.validate()?;

    if source.num_folds() < config.num_folds {
        return Err(anyhow!(
            "{} folds configured but only {} are available",
            config.num_folds,
            source.num_folds()
        ));
    }

    log::info!(
        "Cross-validating {} over {} folds in {}",
        config.model.name(),
        config.num_folds,
        store.log_name()
    );

    let (vocab_size, n_classes) = (config.vocab_size, config.n_classes);

    match &config.model {
        Architecture::Recurrent(model) => {
            run_folds::<B, _, _, _, _>(config, source, store, evaluator, device, |device| {
                model.init::<B>(vocab_size, n_classes, device)
            })
        }
        Architecture::ConvStacked(model) => {
            run_folds::<B, _, _, _, _>(config, source, store, evaluator, device, |device| {
                model.init::<B>(vocab_size, n_classes, device)
            })
        }
        Architecture::ConvSeq2Seq(model) => {
            run_folds::<B, _, _, _, _>(config, source, store, evaluator, device, |device| {
                model.init::<B>(vocab_size, n_classes, device)
            })
        }
    }
}

fn run_folds<B, M, S, E, F>(
    config: &RunConfig,
    source: &S,
    store: &ArtifactStore,
    evaluator: &E,
    device: &B::Device,
    init: F,
) -> anyhow::Result<RunLog>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Tagger<B>,
    M::InnerModule: Tagger<B::InnerBackend>,
    S: FoldSource,
    E: Evaluator,
    F: Fn(&B::Device) -> M,
{
    let mut run_log = RunLog::new(config.clone());

    for fold in 0..config.num_folds {
        let data = source.fold(fold)?;
        data.validate(config.vocab_size, config.n_classes)?;

        log::info!(
            "Fold {}/{}: {} train, {} validation, {} test, {} snippets",
            fold + 1,
            config.num_folds,
            data.train.len(),
            data.validation.len(),
            data.test.len(),
            data.snippets.len()
        );

        let (model, fold_log) =
            train_fold::<B, M, E, F>(config, fold, &data, evaluator, device, &init)?;

        store.save_checkpoint(model.valid(), fold)?;
        run_log.logs.insert(fold, fold_log);
        store.save_log(&run_log)?;
    }

    Ok(run_log)
}

fn train_fold<B, M, E, F>(
    config: &RunConfig,
    fold: usize,
    data: &FoldData,
    evaluator: &E,
    device: &B::Device,
    init: &F,
) -> anyhow::Result<(M, FoldLog)>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Tagger<B>,
    M::InnerModule: Tagger<B::InnerBackend>,
    E: Evaluator,
    F: Fn(&B::Device) -> M,
{
    B::seed(config.fold_seed(fold));

    let mut model = init(device);
    let mut optimizer = AdamWConfig::new()
        .with_epsilon(config.adam_epsilon)
        .with_weight_decay(config.weight_decay)
        .init();
    let mut scheduler = epoch_schedule(config);

    let train_loss = CrossEntropyLossConfig::new().init::<B>(device);
    let eval_loss = CrossEntropyLossConfig::new().init::<B::InnerBackend>(device);

    let eval = |model: &M, examples: &[Example], split: Split| {
        evaluate::<B, _, _, _>(examples, model, &eval_loss, split, evaluator, device)
            .map(LogEntry::Eval)
    };

    let evaluate_all = |model: &M, fold_log: &mut FoldLog| -> anyhow::Result<()> {
        fold_log.train_logs.push(eval(model, &data.train, Split::Train)?);
        fold_log.val_logs.push(eval(model, &data.validation, Split::Validation)?);
        fold_log.test_logs.push(eval(model, &data.test, Split::Test)?);
        fold_log.snippets_losses.push(eval(model, &data.snippets, Split::Snippets)?);

        Ok(())
    };

    let mut fold_log = FoldLog::default();
    evaluate_all(&model, &mut fold_log)?;

    for epoch in 0..config.max_epochs {
        // The first step yields the initial rate
        let learning_rate = <ExponentialLrScheduler as LrScheduler<B>>::step(&mut scheduler);

        log::info!(
            "Fold {} epoch {}/{} (learning rate {:.2e})",
            fold + 1,
            epoch + 1,
            config.max_epochs,
            learning_rate
        );

        let (trained, loss_sum) = train_one_epoch(
            &data.train,
            model,
            &train_loss,
            &mut optimizer,
            learning_rate,
            device,
            config.log_interval,
        )?;
        model = trained;

        fold_log.train_logs.push(LogEntry::Loss(loss_sum));
        fold_log
            .val_logs
            .push(eval(&model, &data.validation, Split::Validation)?);
    }

    evaluate_all(&model, &mut fold_log)?;

    Ok((model, fold_log))
}
