/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 参数统计扩展单元测试
 */

use std::rc::Rc;

use approx::assert_abs_diff_eq;

use super::MockManager;
use crate::errors::TensorError;
use crate::nn::{Module, ModuleDict, Parameter};
use crate::tensor::Tensor;
use crate::training::{
    Extension, ManagerProtocol, ParameterStatistics, Statistics, StatisticFn, TrainingError,
    TriggerLike, UnitLiteral, builtin_statistic, default_statistics, percentile,
};

fn mean_fn() -> StatisticFn {
    Box::new(|x: &Tensor| -> Result<Tensor, TrainingError> { Ok(Tensor::scalar(x.mean()?)) })
}

/// 单参数`W`（值为[1, 3]）的模块
fn single_param_model() -> (Rc<ModuleDict>, Parameter) {
    let w = Parameter::new(Tensor::new(&[1.0, 3.0], &[2]));
    let mut model = ModuleDict::new();
    model.add_parameter("W", w.clone());
    (Rc::new(model), w)
}

/// 两层的模块，参数都带梯度
fn two_layer_model() -> Rc<ModuleDict> {
    let mut fc1 = ModuleDict::new();
    let weight = Parameter::new(Tensor::new(&[0., 1., 2., 3., 4., 5.], &[2, 3]));
    weight.set_grad(Tensor::new(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], &[2, 3]));
    let bias = Parameter::new(Tensor::zeros(&[1, 3]));
    bias.set_grad(Tensor::ones(&[1, 3]));
    fc1.add_parameter("weight", weight).add_parameter("bias", bias);

    let mut model = ModuleDict::new();
    model.add_module("fc1", Rc::new(fc1));
    Rc::new(model)
}

fn every_iteration() -> TriggerLike {
    (1, UnitLiteral::Iteration).into()
}

#[test]
fn test_single_param_mean_reported_immediately() {
    let (model, _) = single_param_model();
    let mut stats = ParameterStatistics::new(model)
        .statistics(Statistics::Custom(vec![("mean".to_string(), mean_fn())]))
        .report_grads(false)
        .trigger(every_iteration());

    let mut manager = MockManager::new(1);
    manager.step();
    stats.call(&mut manager).unwrap();

    assert_eq!(manager.reported.len(), 1);
    assert_eq!(manager.reported[0].len(), 1);
    assert_abs_diff_eq!(manager.reported[0]["W/data/mean"], 2.0);
    assert!(stats.summary().is_empty());
}

#[test]
fn test_default_statistics_keys() {
    let model = two_layer_model();
    let stats = ParameterStatistics::new(model);
    assert_eq!(
        stats.statistic_names(),
        vec!["mean", "std", "min", "max", "zeros"]
    );

    let collected = stats.collect().unwrap();
    // 2个参数 × 2个属性 × 5个统计量
    assert_eq!(collected.len(), 20);
    assert_abs_diff_eq!(collected["fc1.weight/data/mean"], 2.5);
    assert_abs_diff_eq!(collected["fc1.weight/data/min"], 0.0);
    assert_abs_diff_eq!(collected["fc1.weight/data/max"], 5.0);
    assert_abs_diff_eq!(collected["fc1.weight/data/zeros"], 1.0);
    assert_abs_diff_eq!(collected["fc1.weight/data/std"], 3.5f64.sqrt(), epsilon = 1e-6);
    assert_abs_diff_eq!(collected["fc1.weight/grad/max"], 0.6, epsilon = 1e-6);
    assert_abs_diff_eq!(collected["fc1.bias/data/zeros"], 3.0);
    assert_abs_diff_eq!(collected["fc1.bias/grad/mean"], 1.0);
}

#[test]
fn test_default_statistics_match_builtins() {
    let defaults = default_statistics();
    let names: Vec<_> = defaults.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["mean", "std", "min", "max", "zeros"]);

    let x = Tensor::new(&[0.0, 2.0, 0.0, 6.0], &[4]);
    for (name, function) in &defaults {
        let builtin = builtin_statistic(name).unwrap();
        assert_eq!(function(&x).unwrap(), builtin(&x).unwrap(), "统计量{name}");
    }
}

#[test]
fn test_report_params_only_has_no_grad_keys() {
    let stats = ParameterStatistics::new(two_layer_model()).report_grads(false);
    let collected = stats.collect().unwrap();
    assert!(!collected.is_empty());
    assert!(collected.keys().all(|k| !k.contains("/grad/")));
}

#[test]
fn test_report_grads_only_has_no_data_keys() {
    let stats = ParameterStatistics::new(two_layer_model()).report_params(false);
    let collected = stats.collect().unwrap();
    assert_eq!(collected.len(), 10);
    assert!(collected.keys().all(|k| k.contains("/grad/")));
}

#[test]
fn test_no_attrs_produces_nothing() {
    let stats = ParameterStatistics::new(two_layer_model())
        .report_params(false)
        .report_grads(false);
    assert!(stats.attrs().is_empty());
    assert!(stats.collect().unwrap().is_empty());
}

#[test]
fn test_empty_statistics_produce_empty_mapping() {
    for statistics in [Statistics::None, Statistics::Custom(Vec::new())] {
        let stats = ParameterStatistics::new(two_layer_model()).statistics(statistics);
        assert!(stats.statistic_names().is_empty());
        assert!(stats.collect().unwrap().is_empty());
    }
}

#[test]
fn test_missing_grad_is_skipped() {
    let (model, _) = single_param_model();
    let stats = ParameterStatistics::new(model);
    let collected = stats.collect().unwrap();
    assert_eq!(collected.len(), 5);
    assert!(collected.keys().all(|k| k.starts_with("W/data/")));
}

#[test]
fn test_prefix_is_prepended_with_separator() {
    let (model, _) = single_param_model();
    let stats = ParameterStatistics::new(model)
        .statistics(Statistics::Custom(vec![("mean".to_string(), mean_fn())]))
        .prefix("main");
    let collected = stats.collect().unwrap();
    assert_eq!(
        collected.keys().collect::<Vec<_>>(),
        vec!["main/W/data/mean"]
    );

    let (model, _) = single_param_model();
    let unprefixed = ParameterStatistics::new(model)
        .statistics(Statistics::Custom(vec![("mean".to_string(), mean_fn())]))
        .prefix("");
    assert!(unprefixed.collect().unwrap().contains_key("W/data/mean"));
}

#[test]
fn test_register_statistics_takes_effect_next_call() {
    let (model, _) = single_param_model();
    let mut stats = ParameterStatistics::new(model)
        .statistics(Statistics::None)
        .trigger(every_iteration());
    let mut manager = MockManager::new(1);

    manager.step();
    stats.call(&mut manager).unwrap();
    assert!(manager.reported[0].is_empty());

    stats.register_statistics("sum", |x: &Tensor| {
        Ok(Tensor::scalar(x.to_vec().iter().sum::<f32>()))
    });
    manager.step();
    stats.call(&mut manager).unwrap();
    assert_abs_diff_eq!(manager.reported[1]["W/data/sum"], 4.0);
}

#[test]
fn test_register_statistics_overwrites_in_place() {
    let (model, _) = single_param_model();
    let mut stats = ParameterStatistics::new(model).report_grads(false);
    stats.register_statistics("min", |_: &Tensor| Ok(Tensor::scalar(-42.0)));

    assert_eq!(
        stats.statistic_names(),
        vec!["mean", "std", "min", "max", "zeros"]
    );
    assert_abs_diff_eq!(stats.collect().unwrap()["W/data/min"], -42.0);
}

#[test]
fn test_multi_valued_statistic_is_expanded_with_indices() {
    let (model, _) = single_param_model();
    let stats = ParameterStatistics::new(model)
        .statistics(Statistics::Custom(vec![(
            "percentile".to_string(),
            percentile(vec![0.0, 50.0, 100.0]),
        )]))
        .report_grads(false);

    let collected = stats.collect().unwrap();
    assert_eq!(
        collected.keys().collect::<Vec<_>>(),
        vec![
            "W/data/percentile/0",
            "W/data/percentile/1",
            "W/data/percentile/2"
        ]
    );
    assert_abs_diff_eq!(collected["W/data/percentile/0"], 1.0);
    assert_abs_diff_eq!(collected["W/data/percentile/1"], 2.0);
    assert_abs_diff_eq!(collected["W/data/percentile/2"], 3.0);
}

#[test]
fn test_single_element_tensor_output_is_not_indexed() {
    let (model, _) = single_param_model();
    let mut stats = ParameterStatistics::new(model)
        .statistics(Statistics::None)
        .report_grads(false);
    stats.register_statistics("first", |x: &Tensor| {
        Ok(Tensor::new(&x.to_vec()[..1], &[1, 1]))
    });
    let collected = stats.collect().unwrap();
    assert_abs_diff_eq!(collected["W/data/first"], 1.0);
    assert_eq!(collected.len(), 1);
}

#[test]
fn test_empty_statistic_output_is_an_error() {
    let (model, _) = single_param_model();
    let mut stats = ParameterStatistics::new(model)
        .statistics(Statistics::None)
        .report_grads(false);
    stats.register_statistics("nothing", |_: &Tensor| Ok(Tensor::zeros(&[0])));
    assert!(matches!(
        stats.collect(),
        Err(TrainingError::EmptyStatistic { key, function })
            if key == "W/data/nothing" && function == "nothing"
    ));
}

#[test]
fn test_nan_params_are_reported_as_nan_when_skipping() {
    let (model, w) = single_param_model();
    w.set_data(Tensor::new(&[1.0, f32::NAN], &[2]));
    w.set_grad(Tensor::new(&[0.5, 0.5], &[2]));

    let mut stats = ParameterStatistics::new(model).skip_nan_params(true);
    // 若真的被调用，这个统计量会返回多个值
    stats.register_statistics("pair", |_: &Tensor| Ok(Tensor::new(&[7.0, 8.0], &[2])));

    let collected = stats.collect().unwrap();
    for name in ["mean", "std", "min", "max", "zeros", "pair"] {
        assert!(collected[&format!("W/data/{name}")].is_nan(), "{name}");
    }
    assert!(!collected.contains_key("W/data/pair/0"));
    // 梯度中没有NaN，照常统计
    assert_abs_diff_eq!(collected["W/grad/mean"], 0.5);
    assert_abs_diff_eq!(collected["W/grad/pair/1"], 8.0);
}

#[test]
fn test_nan_params_without_skipping_run_functions() {
    let (model, w) = single_param_model();
    w.set_data(Tensor::new(&[1.0, f32::NAN], &[2]));
    let stats = ParameterStatistics::new(model);
    let collected = stats.collect().unwrap();
    assert!(collected["W/data/mean"].is_nan());
    // `zeros`照常计算而不是被替换为NaN
    assert_abs_diff_eq!(collected["W/data/zeros"], 0.0);
}

#[test]
fn test_statistic_error_propagates() {
    let w = Parameter::new(Tensor::zeros(&[0]));
    let mut model = ModuleDict::new();
    model.add_parameter("empty", w);
    let stats = ParameterStatistics::new(Rc::new(model));
    assert!(matches!(
        stats.collect(),
        Err(TrainingError::Tensor(TensorError::EmptyTensor { operation: "mean" }))
    ));
}

#[test]
fn test_duplicate_keys_last_link_wins() {
    let (first, _) = single_param_model();
    let second_w = Parameter::new(Tensor::new(&[10.0, 30.0], &[2]));
    let mut second = ModuleDict::new();
    second.add_parameter("W", second_w);

    let stats = ParameterStatistics::new(vec![first, Rc::new(second)])
        .statistics(Statistics::Custom(vec![("mean".to_string(), mean_fn())]))
        .report_grads(false);
    let collected = stats.collect().unwrap();
    assert_eq!(collected.len(), 1);
    assert_abs_diff_eq!(collected["W/data/mean"], 20.0);
}

#[test]
fn test_accumulates_until_trigger_fires() {
    let (model, w) = single_param_model();
    let mut stats = ParameterStatistics::new(model)
        .statistics(Statistics::Custom(vec![("mean".to_string(), mean_fn())]))
        .report_grads(false)
        .trigger((3, UnitLiteral::Iteration).into());
    let mut manager = MockManager::new(100);

    // 三次调用的均值分别为 2、4、6
    for (i, data) in [[1.0f32, 3.0], [3.0, 5.0], [5.0, 7.0]].iter().enumerate() {
        w.set_data(Tensor::new(data, &[2]));
        manager.step();
        stats.call(&mut manager).unwrap();
        if i < 2 {
            assert!(manager.reported.is_empty());
            assert_eq!(stats.summary().len(), 1);
        }
    }

    assert_eq!(manager.reported.len(), 1);
    assert_abs_diff_eq!(manager.reported[0]["W/data/mean"], 4.0);
    assert!(stats.summary().is_empty());
    assert_abs_diff_eq!(manager.observation()["W/data/mean"], 4.0);

    // 下一轮从空汇总重新开始
    w.set_data(Tensor::new(&[0.0, 0.0], &[2]));
    for _ in 0..3 {
        manager.step();
        stats.call(&mut manager).unwrap();
    }
    assert_eq!(manager.reported.len(), 2);
    assert_abs_diff_eq!(manager.reported[1]["W/data/mean"], 0.0);
}

#[test]
fn test_never_trigger_keeps_accumulating() {
    let (model, _) = single_param_model();
    let mut stats = ParameterStatistics::new(model).trigger(TriggerLike::Never);
    let mut manager = MockManager::new(1);
    for _ in 0..4 {
        manager.step();
        stats.call(&mut manager).unwrap();
    }
    assert!(manager.reported.is_empty());
    assert_eq!(stats.summary().len(), 5);
}

#[test]
fn test_extension_defaults() {
    let (model, _) = single_param_model();
    let stats = ParameterStatistics::new(model);
    assert_eq!(stats.name(), "parameter_statistics");
    assert_eq!(stats.priority(), crate::training::PRIORITY_WRITER);
    assert_eq!(stats.attrs().len(), 2);
    assert!(matches!(
        ParameterStatistics::default_trigger(),
        TriggerLike::Interval(1, UnitLiteral::Epoch)
    ));
    assert_eq!(
        ParameterStatistics::REPORT_KEY_TEMPLATE,
        "{prefix}{param_name}/{attr_name}/{function_name}"
    );
}

#[test]
fn test_statistics_never_mutate_params() {
    let model = two_layer_model();
    let before = model
        .named_parameters()
        .into_iter()
        .map(|(_, p)| (p.data().clone(), p.grad().map(|g| g.clone())))
        .collect::<Vec<_>>();

    let mut stats = ParameterStatistics::new(model.clone()).trigger(every_iteration());
    let mut manager = MockManager::new(1);
    manager.step();
    stats.call(&mut manager).unwrap();

    let after = model
        .named_parameters()
        .into_iter()
        .map(|(_, p)| (p.data().clone(), p.grad().map(|g| g.clone())))
        .collect::<Vec<_>>();
    assert_eq!(before, after);
}
