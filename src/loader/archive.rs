use super::FileFormatError;
use npyz::{npz::NpzArchive, DType, NpyFile};
use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

type Result<T> = std::result::Result<T, FileFormatError>;

/// Named 1D arrays of a `.npz` file
pub struct Archive {
    path: PathBuf,
    npz: NpzArchive<BufReader<File>>,
}
impl Archive {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let npz = NpzArchive::open(&path).map_err(|source| FileFormatError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, npz })
    }
    pub fn names(&self) -> Vec<String> {
        self.npz.array_names().map(|name| name.to_string()).collect()
    }
    /// Reads a floating point array, widening `f4` to `f64`
    pub fn floats(&mut self, array: &str) -> Result<Vec<f64>> {
        let path = self.path.clone();
        let npy = self.by_name(array)?;
        let dtype = type_str(&path, array, &npy)?;
        let read_err = |source| FileFormatError::Read {
            path: path.clone(),
            array: array.to_string(),
            source,
        };
        let kind = dtype.get(1..).unwrap_or_default().to_string();
        match kind.as_str() {
            "f8" => npy.into_vec::<f64>().map_err(read_err),
            "f4" => npy
                .into_vec::<f32>()
                .map(|x| x.into_iter().map(f64::from).collect())
                .map_err(read_err),
            _ => Err(unsupported(&path, array, dtype)),
        }
    }
    /// Reads a fixed-width string array (`U` or `S`), removing the trailing NUL padding
    pub fn labels(&mut self, array: &str) -> Result<Vec<String>> {
        let path = self.path.clone();
        let npy = self.by_name(array)?;
        let dtype = type_str(&path, array, &npy)?;
        let read_err = |source| FileFormatError::Read {
            path: path.clone(),
            array: array.to_string(),
            source,
        };
        let unpad = |s: &str| s.trim_end_matches('\0').to_string();
        let kind = dtype.get(1..2).unwrap_or_default().to_string();
        match kind.as_str() {
            "U" => Ok(npy
                .into_vec::<Vec<char>>()
                .map_err(read_err)?
                .into_iter()
                .map(|chars| unpad(&chars.into_iter().collect::<String>()))
                .collect()),
            "S" => Ok(npy
                .into_vec::<Vec<u8>>()
                .map_err(read_err)?
                .into_iter()
                .map(|bytes| unpad(&String::from_utf8_lossy(&bytes)))
                .collect()),
            _ => Err(unsupported(&path, array, dtype)),
        }
    }
    fn by_name(&mut self, array: &str) -> Result<NpyFile<impl Read + '_>> {
        let path = self.path.clone();
        self.npz
            .by_name(array)
            .map_err(|source| FileFormatError::Read {
                path: path.clone(),
                array: array.to_string(),
                source,
            })?
            .ok_or_else(|| FileFormatError::MissingArrays {
                path,
                names: vec![array.to_string()],
            })
    }
}

/// Returns the array type string (e.g. `<f8`) after checking the array is 1D
fn type_str<R: Read>(path: &Path, array: &str, npy: &NpyFile<R>) -> Result<String> {
    let shape = npy.shape().to_vec();
    if shape.len() != 1 {
        return Err(FileFormatError::NotOneDimensional {
            path: path.to_path_buf(),
            array: array.to_string(),
            shape,
        });
    }
    match npy.dtype() {
        DType::Plain(ts) => Ok(ts.to_string()),
        dtype => Err(unsupported(path, array, dtype.descr())),
    }
}

fn unsupported(path: &Path, array: &str, dtype: String) -> FileFormatError {
    let path = path.to_path_buf();
    let array = array.to_string();
    if dtype.get(1..2) == Some("O") {
        FileFormatError::PickledObjects { path, array }
    } else {
        FileFormatError::UnsupportedDtype { path, array, dtype }
    }
}
