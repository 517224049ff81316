use crate::domain::model::{ContainerChoice, VariantId};
use std::collections::BTreeMap;

pub const DEFAULT_LARGE_ITEM_THRESHOLD: u32 = 15;

/// 容器規格 → 數量
pub type Allocation = BTreeMap<VariantId, u32>;

/// 把目標數量拆成容器組合。
///
/// 先由大到小貪婪地取整數倍 (只在剩餘量不低於 `threshold` 時)，
/// 剩下的零頭再用「最小且裝得下」的單一容器補上；沒有裝得下的容器時
/// 改用最大容器補足。相同輸入永遠得到相同結果。
pub fn allocate(target: u32, containers: &[ContainerChoice], threshold: u32) -> Allocation {
    let mut result = Allocation::new();

    let mut descending: Vec<ContainerChoice> = containers
        .iter()
        .copied()
        .filter(|container| container.size > 0)
        .collect();

    if target == 0 || descending.is_empty() {
        return result;
    }

    descending.sort_by(|a, b| b.size.cmp(&a.size).then(a.variant_id.cmp(&b.variant_id)));

    let mut remaining = target;
    for container in &descending {
        if remaining < threshold {
            break;
        }
        if remaining >= container.size {
            let count = remaining / container.size;
            *result.entry(container.variant_id).or_insert(0) += count;
            remaining %= container.size;
            tracing::debug!(
                size = container.size,
                count,
                remaining,
                "allocated large containers"
            );
        }
    }

    if remaining == 0 {
        return result;
    }

    let best_fit = descending
        .iter()
        .rev()
        .find(|container| container.size >= remaining);

    match best_fit {
        Some(container) => {
            *result.entry(container.variant_id).or_insert(0) += 1;
            tracing::debug!(size = container.size, remaining, "leftover covered by best fit");
        }
        None => {
            // 零頭比最大容器還大：用最大容器補足，不可少裝
            let largest = descending[0];
            let count = remaining.div_ceil(largest.size);
            *result.entry(largest.variant_id).or_insert(0) += count;
            tracing::debug!(size = largest.size, count, remaining, "leftover covered by largest container");
        }
    }

    result
}

/// Σ 數量 × 容器尺寸
pub fn allocated_volume(allocation: &Allocation, containers: &[ContainerChoice]) -> u64 {
    allocation
        .iter()
        .filter_map(|(variant_id, count)| {
            containers
                .iter()
                .find(|container| container.variant_id == *variant_id)
                .map(|container| u64::from(container.size) * u64::from(*count))
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const L: VariantId = VariantId(15);
    const M: VariantId = VariantId(10);
    const S: VariantId = VariantId(5);

    fn containers() -> Vec<ContainerChoice> {
        vec![
            ContainerChoice::new(15, L),
            ContainerChoice::new(10, M),
            ContainerChoice::new(5, S),
        ]
    }

    fn alloc(target: u32) -> Allocation {
        allocate(target, &containers(), DEFAULT_LARGE_ITEM_THRESHOLD)
    }

    #[test]
    fn test_greedy_then_best_fit() {
        let result = alloc(37);

        assert_eq!(result, Allocation::from([(L, 2), (M, 1)]));
        assert_eq!(allocated_volume(&result, &containers()), 40);
    }

    #[test]
    fn test_below_threshold_uses_single_best_fit() {
        assert_eq!(alloc(12), Allocation::from([(L, 1)]));
        assert_eq!(alloc(14), Allocation::from([(L, 1)]));
        assert_eq!(alloc(6), Allocation::from([(M, 1)]));
        assert_eq!(alloc(1), Allocation::from([(S, 1)]));
    }

    #[test]
    fn test_zero_target_or_no_containers_is_empty() {
        assert!(alloc(0).is_empty());
        assert!(allocate(37, &[], DEFAULT_LARGE_ITEM_THRESHOLD).is_empty());
    }

    #[test]
    fn test_exact_multiples_have_no_leftover() {
        assert_eq!(alloc(15), Allocation::from([(L, 1)]));
        assert_eq!(alloc(45), Allocation::from([(L, 3)]));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut shuffled = containers();
        shuffled.reverse();

        for target in 0..=120 {
            assert_eq!(
                allocate(target, &shuffled, DEFAULT_LARGE_ITEM_THRESHOLD),
                alloc(target),
                "target {}",
                target
            );
        }
    }

    #[test]
    fn test_deterministic() {
        for target in 0..=200 {
            assert_eq!(alloc(target), alloc(target));
        }
    }

    #[test]
    fn test_covers_target_with_bounded_slack() {
        let smallest = 5;
        for target in 1..=500u32 {
            let volume = allocated_volume(&alloc(target), &containers());
            assert!(volume >= u64::from(target), "target {} got {}", target, volume);
            assert!(
                volume < u64::from(target + smallest),
                "target {} over-allocated to {}",
                target,
                volume
            );
        }
    }

    #[test]
    fn test_leftover_larger_than_every_container_is_still_covered() {
        let small_only = vec![ContainerChoice::new(5, S)];

        let result = allocate(12, &small_only, DEFAULT_LARGE_ITEM_THRESHOLD);

        assert_eq!(result, Allocation::from([(S, 3)]));
        assert!(allocated_volume(&result, &small_only) >= 12);
    }

    #[test]
    fn test_uneven_sizes_stay_total_but_not_tight() {
        let uneven = vec![ContainerChoice::new(10, M), ContainerChoice::new(3, S)];

        for target in 0..=200u32 {
            let volume = allocated_volume(&allocate(target, &uneven, DEFAULT_LARGE_ITEM_THRESHOLD), &uneven);
            assert!(volume >= u64::from(target), "target {} got {}", target, volume);
        }

        // 14 低於門檻且沒有裝得下的單一容器：取 ceil(14 / 10) 個最大容器，多出 6 (超過最小尺寸 3)
        let result = allocate(14, &uneven, DEFAULT_LARGE_ITEM_THRESHOLD);
        assert_eq!(result, Allocation::from([(M, 2)]));
        assert_eq!(allocated_volume(&result, &uneven), 20);
    }

    #[test]
    fn test_zero_sized_containers_are_ignored() {
        let with_zero = vec![ContainerChoice::new(0, VariantId(99)), ContainerChoice::new(10, M)];

        assert_eq!(
            allocate(7, &with_zero, DEFAULT_LARGE_ITEM_THRESHOLD),
            Allocation::from([(M, 1)])
        );
    }

    #[test]
    fn test_threshold_controls_greedy_phase() {
        // 門檻為 0 時每種尺寸都會先取整數倍
        assert_eq!(
            allocate(37, &containers(), 0),
            Allocation::from([(L, 2), (S, 2)])
        );
    }
}
