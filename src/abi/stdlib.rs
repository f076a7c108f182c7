// Tue Oct 13 2026 - Alex

use crate::abi::{AbiFamily, AbiProfile};
use crate::layout::{Categories, Composite, DataType, TypeRegistry, Typedef};
use log::debug;

/// Handles to the standard library types every later stage refers to.
#[derive(Debug, Clone)]
pub struct StdTypes {
    pub uint8: DataType,
    pub uint16: DataType,
    pub uint32: DataType,
    pub uint64: DataType,
    pub int8: DataType,
    pub int16: DataType,
    pub int32: DataType,
    pub int64: DataType,
    pub int: DataType,
    pub long: DataType,
    pub size_t: DataType,
    pub string: DataType,
    pub fstream: DataType,
    pub vector_bool: DataType,
    pub deque: DataType,
    pub bit_array: DataType,
}

impl StdTypes {
    pub fn create(registry: &mut TypeRegistry, abi: &AbiProfile, categories: &Categories) -> Self {
        debug!("creating stdlib types for {}", abi);
        let ptr = abi.pointer_size;
        let std = categories.std.as_str();
        registry.create_category(&categories.root);
        registry.create_category(std);

        let mut int_typedef = |name: &str, target: DataType| registry.create(std, Typedef::new(name, target));
        let uint8 = int_typedef("uint8_t", DataType::unsigned(1));
        let uint16 = int_typedef("uint16_t", DataType::unsigned(2));
        let uint32 = int_typedef("uint32_t", DataType::unsigned(4));
        let uint64 = int_typedef("uint64_t", DataType::unsigned(8));
        let int8 = int_typedef("int8_t", DataType::signed(1));
        let int16 = int_typedef("int16_t", DataType::signed(2));
        let int32 = int_typedef("int32_t", DataType::signed(4));
        let int64 = int_typedef("int64_t", DataType::signed(8));
        let long = int_typedef("long", DataType::signed(ptr));
        let size_t = int_typedef("size_t", DataType::unsigned(ptr));
        let int = int_typedef("int", DataType::signed(4));

        let mut string = Composite::structure("string");
        let mut bit_vector = Composite::structure("vector<bool>");
        let mut fstream = Composite::structure("fstream").with_minimum_alignment(ptr);
        let mut deque = Composite::structure("deque").with_minimum_alignment(ptr);

        match abi.family {
            AbiFamily::Itanium => {
                let mut rep = Composite::structure("_string_rep");
                member(registry, &mut rep, size_t.clone(), "_M_length");
                member(registry, &mut rep, size_t.clone(), "_M_capacity");
                member(registry, &mut rep, int.clone(), "_M_refcount");
                let rep = registry.create(std, rep);

                let mut data_plus = Composite::union("_string_dataplus");
                unnamed(registry, &mut data_plus, DataType::pointer_to(rep));
                unnamed(registry, &mut data_plus, DataType::pointer_to(DataType::TerminatedString));
                let data_plus = registry.create(std, data_plus);
                member(registry, &mut string, data_plus, "_M_p");

                let mut bit_iterator = Composite::structure("_bit_iterator");
                member(registry, &mut bit_iterator, DataType::pointer_to(size_t.clone()), "_M_p");
                member(registry, &mut bit_iterator, uint32.clone(), "_M_offset");
                let bit_iterator = registry.create(std, bit_iterator);

                member(registry, &mut bit_vector, bit_iterator.clone(), "_M_start");
                member(registry, &mut bit_vector, bit_iterator, "_M_finish");
                member(registry, &mut bit_vector, DataType::pointer_to(size_t.clone()), "_M_end_of_storage");
            }
            AbiFamily::Msvc => {
                let mut string_val = Composite::union("_string_val");
                string_val.add(DataType::String, 16, 1, Some("_Buf".to_string()), None);
                member(registry, &mut string_val, DataType::pointer_to(DataType::TerminatedString), "_Ptr");
                let string_val = registry.create(std, string_val);

                member(registry, &mut string, string_val, "_Bx");
                member(registry, &mut string, size_t.clone(), "_Mysize");
                member(registry, &mut string, size_t.clone(), "_Myres");

                let size = abi.bit_vector_size.unwrap_or(4 * ptr);
                bit_vector.set_minimum_alignment(ptr);
                unnamed(registry, &mut bit_vector, DataType::undefined(size));
            }
        }
        unnamed(registry, &mut fstream, DataType::undefined(abi.fstream_size));
        unnamed(registry, &mut deque, DataType::undefined(abi.deque_size));

        let fstream = registry.create(std, fstream);
        let string = registry.create(std, string);
        let vector_bool = registry.create(std, bit_vector);
        let deque = registry.create(std, deque);

        let mut bit_array = Composite::structure("BitArray");
        member(registry, &mut bit_array, DataType::pointer_to(DataType::undefined(1)), "ptr");
        member(registry, &mut bit_array, DataType::unsigned(ptr), "count");
        let bit_array = registry.create(&categories.root, bit_array);

        registry.create_category(&categories.enums);
        registry.create_category(&categories.vtables);
        registry.create_category(&categories.methods);

        Self {
            uint8,
            uint16,
            uint32,
            uint64,
            int8,
            int16,
            int32,
            int64,
            int,
            long,
            size_t,
            string,
            fstream,
            vector_bool,
            deque,
            bit_array,
        }
    }

    /// The fixed-width integer a `number` field subtype names.
    pub fn integer(&self, subtype: &str) -> Option<&DataType> {
        let dt = match subtype {
            "int8_t" => &self.int8,
            "int16_t" => &self.int16,
            "int32_t" => &self.int32,
            "int64_t" => &self.int64,
            "uint8_t" => &self.uint8,
            "uint16_t" => &self.uint16,
            "uint32_t" => &self.uint32,
            "uint64_t" => &self.uint64,
            "long" => &self.long,
            _ => return None,
        };
        Some(dt)
    }
}

fn member(registry: &TypeRegistry, composite: &mut Composite, data_type: DataType, name: &str) {
    push(registry, composite, data_type, Some(name.to_string()));
}

fn unnamed(registry: &TypeRegistry, composite: &mut Composite, data_type: DataType) {
    push(registry, composite, data_type, None);
}

fn push(registry: &TypeRegistry, composite: &mut Composite, data_type: DataType, name: Option<String>) {
    let length = registry.size_of(&data_type).unwrap_or(1);
    let alignment = registry.alignment_of(&data_type);
    composite.add(data_type, length, alignment, name, None);
}
