//! Randomized operation sequences checked against `Vec`.

use crate::{ArrayBase, CopyStrategy, Storage};

/// Applies one random operation to both the array and the model.
fn step<T, S, C>(
    rng: &mut fastrand::Rng,
    a: &mut ArrayBase<T, S, C>,
    model: &mut Vec<T>,
    make: &impl Fn(u32) -> T,
) where
    T: Clone + PartialEq + std::fmt::Debug,
    S: Storage<T>,
    C: CopyStrategy<T>,
{
    let len = model.len();
    let room = a.max_size() - len;
    let value = make(rng.u32(..1000));
    match rng.u8(0..14) {
        0 if room > 0 => {
            a.push_back(value.clone()).unwrap();
            model.push(value);
        }
        1 if room > 0 => {
            let pos = rng.usize(0..=len);
            a.insert(pos, value.clone()).unwrap();
            model.insert(pos, value);
        }
        2 => {
            let count = rng.usize(0..=room.min(5));
            let pos = rng.usize(0..=len);
            a.insert_fill(pos, count, &value).unwrap();
            model.splice(pos..pos, std::iter::repeat_n(value, count));
        }
        3 => {
            let pos = rng.usize(0..=len);
            let n1 = rng.usize(0..=len - pos);
            let count = rng.usize(0..=(room + n1).min(6));
            let values: Vec<T> = (0..count).map(|i| make(i as u32)).collect();
            a.replace_slice(pos, n1, &values).unwrap();
            model.splice(pos..pos + n1, values);
        }
        4 if len > 0 => {
            let pos = rng.usize(0..len);
            let count = rng.usize(0..=len - pos);
            a.erase(pos, count);
            model.drain(pos..pos + count);
        }
        5 => {
            let odds = rng.u32(1..4);
            let doomed: Vec<bool> = (0..len).map(|_| rng.u32(0..odds) == 0).collect();
            let mut visited = 0;
            let removed = a.erase_if(|_| {
                visited += 1;
                doomed[visited - 1]
            });
            assert_eq!(removed, doomed.iter().filter(|&&d| d).count());
            let mut index = 0;
            model.retain(|_| {
                index += 1;
                !doomed[index - 1]
            });
        }
        6 => {
            assert_eq!(a.pop_back(), model.pop());
        }
        7 => {
            let front = a.pop_front();
            let expected = (!model.is_empty()).then(|| model.remove(0));
            assert_eq!(front, expected);
        }
        8 => {
            let new_len = rng.usize(0..=(len + room.min(8)));
            a.resize(new_len, &value).unwrap();
            model.resize(new_len, value);
        }
        9 => {
            let n = rng.usize(0..=len);
            a.truncate(n);
            model.truncate(n);
        }
        10 if len > 0 => {
            let start = rng.usize(0..len);
            let end = rng.usize(start..=len);
            let pos = rng.usize(0..=len);
            let n1 = rng.usize(0..=len - pos);
            if len - n1 + (end - start) <= a.max_size() {
                a.replace_within(pos, n1, start..end).unwrap();
                let copy = model[start..end].to_vec();
                model.splice(pos..pos + n1, copy);
            }
        }
        11 => {
            let count = rng.usize(0..=a.max_size().min(8));
            let values: Vec<T> = (0..count).map(|i| make(i as u32 + 7)).collect();
            a.assign_slice(&values).unwrap();
            *model = values;
        }
        12 => {
            let extra = rng.usize(0..=room.min(10));
            let capacity = a.capacity();
            a.reserve_back(extra).unwrap();
            assert!(a.capacity() >= capacity);
            assert!(a.capacity() - a.len() >= extra);
        }
        _ => {
            let mut b = a.take();
            assert!(a.is_empty());
            a.swap(&mut b);
            assert!(b.is_empty());
        }
    }
    assert!(a.len() <= a.capacity());
    assert!(a.capacity() <= a.max_size());
    assert_eq!(a.as_slice(), model.as_slice());
}

fn run<T, S, C>(seed: u64, steps: usize, make: impl Fn(u32) -> T)
where
    T: Clone + PartialEq + std::fmt::Debug,
    S: Storage<T>,
    C: CopyStrategy<T>,
{
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut a = ArrayBase::<T, S, C>::new();
    let mut model = Vec::new();
    for _ in 0..steps {
        step(&mut rng, &mut a, &mut model, &make);
        if model.len() > 300 {
            a.truncate(100);
            model.truncate(100);
        }
    }
}

#[test]
fn test_model_general_heap() {
    use crate::{General, HeapStorage};

    run::<String, HeapStorage<String>, General>(1, 5_000, |v| v.to_string());
}

#[test]
fn test_model_bitwise_heap() {
    use crate::{Bitwise, HeapStorage};

    run::<u64, HeapStorage<u64>, Bitwise>(2, 5_000, u64::from);
}

#[test]
fn test_model_fixed() {
    use crate::{Bitwise, FixedStorage, General};

    run::<String, FixedStorage<String, 24>, General>(3, 5_000, |v| format!("<{v}>"));
    run::<u16, FixedStorage<u16, 24>, Bitwise>(4, 5_000, |v| v as u16);
}

#[test]
fn test_bitwise_and_general_agree() {
    use crate::{Array, PodArray};

    let mut rng = fastrand::Rng::with_seed(11);
    let mut general = Array::<u32>::new();
    let mut bitwise = PodArray::<u32>::new();
    for _ in 0..3_000 {
        let len = general.len();
        match rng.u8(0..4) {
            0 => {
                let pos = rng.usize(0..=len);
                let values: Vec<u32> = (0..rng.usize(0..5)).map(|_| rng.u32(..)).collect();
                general.insert_slice(pos, &values).unwrap();
                bitwise.insert_slice(pos, &values).unwrap();
            }
            1 if len > 0 => {
                let pos = rng.usize(0..len);
                let count = rng.usize(0..=len - pos);
                general.erase(pos, count);
                bitwise.erase(pos, count);
            }
            2 => {
                let count = rng.usize(0..6);
                let value = rng.u32(..);
                general.append_fill(count, &value).unwrap();
                bitwise.append_fill(count, &value).unwrap();
            }
            _ if len > 0 => {
                let start = rng.usize(0..len);
                let end = rng.usize(start..=len);
                let pos = rng.usize(0..=len);
                general.insert_within(pos, start..end).unwrap();
                bitwise.insert_within(pos, start..end).unwrap();
            }
            _ => {}
        }
        if general.len() > 400 {
            general.erase_left(300);
            bitwise.erase_left(300);
        }
        assert_eq!(general, bitwise);
    }
}
