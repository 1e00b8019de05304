//! `.npz` fixtures for the tests, written with [npyz::npz::NpzWriter]

use npyz::{npz::NpzWriter, DType, WriterBuilder};
use std::path::Path;

enum Array {
    Floats { shape: Vec<u64>, values: Vec<f64> },
    Floats32(Vec<f32>),
    Ints(Vec<i64>),
    Unicode(Vec<String>),
    Bytes(Vec<String>),
}

#[derive(Default)]
pub struct NpzFixture {
    arrays: Vec<(String, Array)>,
}
impl NpzFixture {
    pub fn new() -> Self {
        Default::default()
    }
    fn push(mut self, name: &str, array: Array) -> Self {
        self.arrays.push((name.to_string(), array));
        self
    }
    pub fn floats(self, name: &str, values: &[f64]) -> Self {
        self.floats_nd(name, &[values.len() as u64], values)
    }
    /// `<f8` array of any shape, `values` in C order
    pub fn floats_nd(self, name: &str, shape: &[u64], values: &[f64]) -> Self {
        let array = Array::Floats {
            shape: shape.to_vec(),
            values: values.to_vec(),
        };
        self.push(name, array)
    }
    pub fn floats32(self, name: &str, values: &[f32]) -> Self {
        self.push(name, Array::Floats32(values.to_vec()))
    }
    pub fn ints(self, name: &str, values: &[i64]) -> Self {
        self.push(name, Array::Ints(values.to_vec()))
    }
    /// Fixed-width unicode strings (`<Un`)
    pub fn unicode(self, name: &str, labels: &[&str]) -> Self {
        let labels = labels.iter().map(|l| l.to_string()).collect();
        self.push(name, Array::Unicode(labels))
    }
    /// Fixed-width byte strings (`|Sn`)
    pub fn bytes(self, name: &str, labels: &[&str]) -> Self {
        let labels = labels.iter().map(|l| l.to_string()).collect();
        self.push(name, Array::Bytes(labels))
    }
    pub fn write<P: AsRef<Path>>(self, path: P) {
        let mut npz = NpzWriter::create(path).unwrap();
        for (name, array) in self.arrays {
            match array {
                Array::Floats { shape, values } => {
                    let mut w = npz
                        .array::<f64>(&name, Default::default())
                        .unwrap()
                        .default_dtype()
                        .shape(&shape)
                        .begin_nd()
                        .unwrap();
                    w.extend(values).unwrap();
                    w.finish().unwrap();
                }
                Array::Floats32(values) => {
                    let mut w = npz
                        .array::<f32>(&name, Default::default())
                        .unwrap()
                        .default_dtype()
                        .shape(&[values.len() as u64])
                        .begin_nd()
                        .unwrap();
                    w.extend(values).unwrap();
                    w.finish().unwrap();
                }
                Array::Ints(values) => {
                    let mut w = npz
                        .array::<i64>(&name, Default::default())
                        .unwrap()
                        .default_dtype()
                        .shape(&[values.len() as u64])
                        .begin_nd()
                        .unwrap();
                    w.extend(values).unwrap();
                    w.finish().unwrap();
                }
                Array::Unicode(labels) => {
                    let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(1);
                    let mut w = npz
                        .array::<str>(&name, Default::default())
                        .unwrap()
                        .dtype(string_dtype("<U", width))
                        .shape(&[labels.len() as u64])
                        .begin_nd()
                        .unwrap();
                    for label in &labels {
                        w.push(label.as_str()).unwrap();
                    }
                    w.finish().unwrap();
                }
                Array::Bytes(labels) => {
                    let width = labels.iter().map(|l| l.len()).max().unwrap_or(1);
                    let mut w = npz
                        .array::<[u8]>(&name, Default::default())
                        .unwrap()
                        .dtype(string_dtype("|S", width))
                        .shape(&[labels.len() as u64])
                        .begin_nd()
                        .unwrap();
                    for label in &labels {
                        w.push(label.as_bytes()).unwrap();
                    }
                    w.finish().unwrap();
                }
            }
        }
    }
}

fn string_dtype(prefix: &str, width: usize) -> DType {
    DType::Plain(format!("{}{}", prefix, width.max(1)).parse().unwrap())
}

/// ETC table with limiting fluxes and saturation limits derived from `sns`
pub fn etc_table<P: AsRef<Path>>(path: P, wavelengths: &[f64], sns: &[f64], configs: &[&str]) {
    let lim_fluxes: Vec<f64> = sns.iter().map(|x| x * 10.).collect();
    let sat_limits: Vec<f64> = sns.iter().map(|x| x * 1e4).collect();
    NpzFixture::new()
        .floats("wavelengths", wavelengths)
        .floats("sns", sns)
        .floats("lim_fluxes", &lim_fluxes)
        .floats("sat_limits", &sat_limits)
        .unicode("configs", configs)
        .write(path);
}

/// 3 configurations x 5 wavelengths
pub fn three_by_five<P: AsRef<Path>>(path: P) -> (Vec<f64>, Vec<f64>, Vec<&'static str>) {
    let mut wavelengths = vec![];
    let mut sns = vec![];
    let mut configs = vec![];
    for (k, config) in ["F560W", "F770W", "F1000W"].into_iter().enumerate() {
        for i in 0..5 {
            wavelengths.push(5. + k as f64 * 2. + i as f64 * 0.25);
            sns.push((k * 5 + i + 1) as f64 * 1e-3);
            configs.push(config);
        }
    }
    etc_table(&path, &wavelengths, &sns, &configs);
    (wavelengths, sns, configs)
}
